use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use super::domain::{Property, PropertyId};

/// Keyed home of the listings shown on screen.
///
/// Saves replace whole entries; readers re-render from the store instead of holding on to a
/// mutable listing.
#[derive(Debug, Default)]
pub struct PropertyStore {
    entries: RwLock<BTreeMap<PropertyId, Property>>,
    revision: AtomicU64,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(properties: impl IntoIterator<Item = Property>) -> Self {
        let store = Self::new();
        for property in properties {
            store.insert(property);
        }
        store
    }

    /// Adds or overwrites a listing, returning the previous value.
    pub fn insert(&self, property: Property) -> Option<Property> {
        let mut guard = self.entries.write().expect("property store lock poisoned");
        let previous = guard.insert(property.id.clone(), property);
        self.revision.fetch_add(1, Ordering::AcqRel);
        previous
    }

    /// Swaps an existing entry for its updated value. Unknown ids are left alone.
    pub fn replace(&self, property: Property) -> Option<Property> {
        let mut guard = self.entries.write().expect("property store lock poisoned");
        let slot = guard.get_mut(&property.id)?;
        let previous = std::mem::replace(slot, property);
        self.revision.fetch_add(1, Ordering::AcqRel);
        Some(previous)
    }

    pub fn get(&self, id: &PropertyId) -> Option<Property> {
        let guard = self.entries.read().expect("property store lock poisoned");
        guard.get(id).cloned()
    }

    pub fn all(&self) -> Vec<Property> {
        let guard = self.entries.read().expect("property store lock poisoned");
        guard.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("property store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bumped on every write.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }
}
