use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::TransportError;
use crate::config::BackendConfig;
use crate::workflows::map::{BoundedQuery, FeatureCollection, MapDataGateway};
use crate::workflows::moderation::{
    Property, PropertyGateway, PropertyId, PropertyUpdate, UpdatePayload,
};

const USER_AGENT: &str = concat!("realty-desk/", env!("CARGO_PKG_VERSION"));

/// REST client for the listings backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
    api_token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, TransportError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TransportError::Unavailable(format!("{} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status { status, body })
    }

    async fn execute_json<T>(&self, request: RequestBuilder) -> Result<T, TransportError>
    where
        T: DeserializeOwned,
    {
        let bytes = self.execute(request).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

#[async_trait]
impl PropertyGateway for BackendClient {
    async fn property(&self, id: &PropertyId) -> Result<Property, TransportError> {
        let url = self.endpoint(&["properties", &id.0])?;
        self.execute_json(self.client.get(url)).await
    }

    async fn update_moderation(
        &self,
        id: &PropertyId,
        payload: &UpdatePayload,
    ) -> Result<PropertyUpdate, TransportError> {
        let url = self.endpoint(&["properties", &id.0, "moderation-listing"])?;
        debug!(
            property = %id,
            status = payload.moderation_status.label(),
            "sending moderation update"
        );
        self.execute_json(self.client.patch(url).json(payload)).await
    }

    async fn similar(&self, id: &PropertyId) -> Result<Vec<Property>, TransportError> {
        let url = self.endpoint(&["properties", &id.0, "similar"])?;
        self.execute_json(self.client.get(url)).await
    }

    async fn record_view(&self, id: &PropertyId) -> Result<(), TransportError> {
        let url = self.endpoint(&["properties", &id.0, "view"])?;
        self.execute(self.client.post(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl MapDataGateway for BackendClient {
    async fn fetch_features(
        &self,
        query: &BoundedQuery,
    ) -> Result<FeatureCollection, TransportError> {
        let url = self.endpoint(&["properties", "map"])?;
        let request = self.client.get(url).query(&query.to_query_pairs());
        self.execute_json(request).await
    }

    async fn fetch_property(&self, property_id: &PropertyId) -> Result<Property, TransportError> {
        PropertyGateway::property(self, property_id).await
    }
}
