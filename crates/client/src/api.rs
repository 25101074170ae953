//! Remote inventory service.
//!
//! `InventoryApi` is the seam the controller talks through; `HttpInventoryApi`
//! implements it over the service's REST endpoints:
//!
//! - `GET /inventory` → JSON array of items
//! - `PUT /inventory/{id}` with the full item → updated item (body optional)
//! - `DELETE /inventory/{id}` → empty success

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use stockview_core::ItemId;
use stockview_inventory::InventoryItem;

use crate::config::ClientConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Fetch the full collection, in service order.
    async fn list_items(&self) -> Result<Vec<InventoryItem>, ApiError>;

    /// Replace one record. `Ok(None)` means the service accepted the write
    /// without echoing the stored record back.
    async fn update_item(&self, item: &InventoryItem) -> Result<Option<InventoryItem>, ApiError>;

    /// Delete one record.
    async fn delete_item(&self, id: &ItemId) -> Result<(), ApiError>;
}

/// HTTP client for the inventory service.
#[derive(Debug, Clone)]
pub struct HttpInventoryApi {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpInventoryApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let api = Self::new(config.api_url.clone(), config.timeout)?;
        Ok(match &config.auth_token {
            Some(token) => api.with_token(token.clone()),
            None => api,
        })
    }

    /// `{base}/inventory[/{id}]`, with the id percent-encoded as one segment.
    fn endpoint(&self, id: Option<&ItemId>) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::Network(format!("invalid base URL: {}", self.base_url)))?;
            segments.pop_if_empty().push("inventory");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, ApiError> {
        let resp = self
            .authorize(req)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ApiError::Api(
                resp.status().as_u16(),
                resp.text().await.unwrap_or_default(),
            ));
        }

        Ok(resp)
    }
}

#[async_trait]
impl InventoryApi for HttpInventoryApi {
    async fn list_items(&self) -> Result<Vec<InventoryItem>, ApiError> {
        let url = self.endpoint(None)?;
        tracing::debug!(%url, "fetching inventory");

        let resp = self.send(self.client.get(url)).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(format!("failed to parse inventory list: {e}")))
    }

    async fn update_item(&self, item: &InventoryItem) -> Result<Option<InventoryItem>, ApiError> {
        let url = self.endpoint(Some(&item.id))?;
        tracing::debug!(%url, "updating item");

        let resp = self.send(self.client.put(url).json(item)).await?;
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| ApiError::Parse(format!("failed to parse updated item: {e}")))
    }

    async fn delete_item(&self, id: &ItemId) -> Result<(), ApiError> {
        let url = self.endpoint(Some(id))?;
        tracing::debug!(%url, "deleting item");

        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
