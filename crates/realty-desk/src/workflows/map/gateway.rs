use async_trait::async_trait;

use super::features::FeatureCollection;
use super::query::BoundedQuery;
use crate::backend::TransportError;
use crate::workflows::moderation::{Property, PropertyId};

/// Source of map features and listing details.
#[async_trait]
pub trait MapDataGateway: Send + Sync {
    async fn fetch_features(&self, query: &BoundedQuery)
        -> Result<FeatureCollection, TransportError>;

    async fn fetch_property(&self, property_id: &PropertyId) -> Result<Property, TransportError>;
}
