//! HTTP implementation of [`RecordStore`] for the inventory API.
//!
//! - `GET {base}/api/inventory?limit=N` returns `{"items": [...]}`
//! - `PATCH {base}/api/inventory` with `{"item_id": ..., "tags": [...]}`
//!
//! Non-2xx answers become [`StoreError::Status`] carrying the status code and
//! body. Timeouts and connection failures become [`StoreError::Transport`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, info};

use invtag_core::{Error, InventoryPage, Record, RecordStore, Result, StoreError, TagPatch};

use crate::config::ClientConfig;

/// Inventory API client.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: Client,
    config: ClientConfig,
}

impl HttpRecordStore {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            base_url = %config.base_url,
            timeout_secs = config.timeout_secs,
            "Initializing inventory client"
        );

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Get the current configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn transport_error(method: &str, url: &str, e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Transport(format!("{} {} timed out: {}", method, url, e))
    } else {
        StoreError::Transport(format!("{} {} failed: {}", method, url, e))
    }
}

/// Turn non-2xx responses into [`StoreError::Status`].
async fn ensure_success(response: Response) -> std::result::Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn list_records(&self, limit: usize) -> std::result::Result<Vec<Record>, StoreError> {
        let url = self.config.inventory_url();
        let limit = limit.max(1);
        let start = Instant::now();

        debug!(url = %url, limit, "Listing inventory");

        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| transport_error("GET", &url, e))?;

        let response = ensure_success(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| transport_error("GET", &url, e))?;

        let page: InventoryPage = serde_json::from_str(&body).map_err(|e| {
            StoreError::InvalidResponse(format!("inventory listing is not an item collection: {}", e))
        })?;

        debug!(
            result_count = page.items.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed inventory"
        );

        Ok(page.items)
    }

    async fn patch_tags(
        &self,
        item_id: &str,
        tags: &[String],
    ) -> std::result::Result<(), StoreError> {
        let url = self.config.inventory_url();
        let start = Instant::now();
        let payload = TagPatch {
            item_id: item_id.to_string(),
            tags: tags.to_vec(),
        };

        let response = self
            .client
            .patch(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| transport_error("PATCH", &url, e))?;

        ensure_success(response).await?;

        debug!(
            item_id,
            tag_count = tags.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Patched tags"
        );

        Ok(())
    }
}
