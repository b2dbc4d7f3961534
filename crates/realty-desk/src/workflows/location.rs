//! The visitor's selected city, shared by listing search and the map.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::map::{LatLng, MapFilters};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub city: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub center: Option<LatLng>,
}

impl SelectedLocation {
    pub fn city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            district: None,
            center: None,
        }
    }

    /// Listing filters implied by this location.
    pub fn filters(&self) -> MapFilters {
        let mut params = vec![("city", self.city.as_str())];
        if let Some(district) = &self.district {
            params.push(("district", district.as_str()));
        }
        MapFilters::from_params(params)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocationStorageError {
    #[error("location storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored location is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Where the selection survives between sessions.
pub trait LocationStorage: Send + Sync {
    fn load(&self) -> Result<Option<SelectedLocation>, LocationStorageError>;
    fn save(&self, location: Option<&SelectedLocation>) -> Result<(), LocationStorageError>;
}

/// Keeps the selection serialized as JSON in memory, like a browser key-value store would.
#[derive(Debug, Default)]
pub struct InMemoryLocationStorage {
    value: Mutex<Option<String>>,
}

impl InMemoryLocationStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> Option<String> {
        self.value.lock().expect("location storage mutex poisoned").clone()
    }

    pub fn set_raw(&self, raw: impl Into<String>) {
        *self.value.lock().expect("location storage mutex poisoned") = Some(raw.into());
    }
}

impl LocationStorage for InMemoryLocationStorage {
    fn load(&self) -> Result<Option<SelectedLocation>, LocationStorageError> {
        let guard = self.value.lock().expect("location storage mutex poisoned");
        match guard.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, location: Option<&SelectedLocation>) -> Result<(), LocationStorageError> {
        let serialized = location.map(serde_json::to_string).transpose()?;
        *self.value.lock().expect("location storage mutex poisoned") = serialized;
        Ok(())
    }
}

type Listener = Arc<dyn Fn(Option<&SelectedLocation>) + Send + Sync>;

struct Inner {
    current: Mutex<Option<SelectedLocation>>,
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_listener: Mutex<u64>,
    storage: Arc<dyn LocationStorage>,
}

/// Observable selected location. Clones share the same state.
#[derive(Clone)]
pub struct LocationStore {
    inner: Arc<Inner>,
}

impl LocationStore {
    /// Restores the last saved selection; unreadable storage starts empty.
    pub fn new(storage: Arc<dyn LocationStorage>) -> Self {
        let current = storage.load().unwrap_or_else(|err| {
            warn!(error = %err, "saved location ignored");
            None
        });

        Self {
            inner: Arc::new(Inner {
                current: Mutex::new(current),
                listeners: Mutex::new(BTreeMap::new()),
                next_listener: Mutex::new(0),
                storage,
            }),
        }
    }

    pub fn current(&self) -> Option<SelectedLocation> {
        self.inner
            .current
            .lock()
            .expect("location mutex poisoned")
            .clone()
    }

    pub fn select(&self, location: SelectedLocation) {
        self.set(Some(location));
    }

    pub fn clear(&self) {
        self.set(None);
    }

    fn set(&self, location: Option<SelectedLocation>) {
        {
            let mut current = self.inner.current.lock().expect("location mutex poisoned");
            if *current == location {
                return;
            }
            current.clone_from(&location);
        }

        if let Err(err) = self.inner.storage.save(location.as_ref()) {
            warn!(error = %err, "location selection not persisted");
        }

        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .expect("location listeners mutex poisoned")
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(location.as_ref());
        }
    }

    /// Registers `listener` for changes until the returned handle is dropped.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(Option<&SelectedLocation>) + Send + Sync + 'static,
    {
        let id = {
            let mut next = self
                .inner
                .next_listener
                .lock()
                .expect("location listener counter poisoned");
            *next += 1;
            *next
        };

        self.inner
            .listeners
            .lock()
            .expect("location listeners mutex poisoned")
            .insert(id, Arc::new(listener));

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .expect("location listeners mutex poisoned")
            .len()
    }
}

/// Active listener registration; dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<Inner>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            if let Ok(mut listeners) = inner.listeners.lock() {
                listeners.remove(&self.id);
            }
        }
    }
}
