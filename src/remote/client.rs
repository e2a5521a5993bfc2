//! Media API Client
//!
//! HTTP client for the authoritative media collection API. Constructed once
//! at process start and passed by reference to the consistency layer, so
//! tests can substitute a fake store behind the same trait.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::errors::StoreError;
use super::types::{AddOutcome, MediaDraft, MediaItem};

/// HTTP client timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The authoritative media collection.
///
/// `create` reports a natural-key collision as [`AddOutcome::Conflict`];
/// `delete` treats an absent id as success.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Full collection, ordered by `added_at` descending by convention
    async fn list(&self) -> Result<Vec<MediaItem>, StoreError>;

    /// Submit a draft; the store assigns `id` and `added_at`
    async fn create(&self, draft: &MediaDraft) -> Result<AddOutcome, StoreError>;

    /// Delete by surrogate id (idempotent)
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Client for the media API (`/api/media` CRUD endpoints)
pub struct ApiClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL of the deployment, without a trailing slash
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API at `base_url`
    pub fn new(base_url: &str) -> Result<Self, StoreError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Request(format!("Failed to create HTTP client: {}", e)))?;

        let client = Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        };
        info!(base_url = %client.base_url, "Media API client ready");
        Ok(client)
    }

    fn media_url(&self) -> String {
        format!("{}/api/media", self.base_url)
    }
}

#[async_trait]
impl MediaStore for ApiClient {
    async fn list(&self) -> Result<Vec<MediaItem>, StoreError> {
        let response = self.http_client.get(self.media_url()).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::from_status(status, &body));
        }

        let items: Vec<MediaItem> = response.json().await?;
        debug!(count = items.len(), "Listed media items from API");
        Ok(items)
    }

    async fn create(&self, draft: &MediaDraft) -> Result<AddOutcome, StoreError> {
        let response = self
            .http_client
            .post(self.media_url())
            .json(draft)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            debug!(key = %draft.natural_key(), "Item already exists in store");
            return Ok(AddOutcome::Conflict);
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::from_status(status, &body));
        }

        let item: MediaItem = response.json().await?;
        info!(id = %item.id, key = %item.natural_key(), "Media item created");
        Ok(AddOutcome::Added(item))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = format!("{}?id={}", self.media_url(), urlencoding::encode(id));
        let response = self.http_client.delete(&url).send().await?;

        // An already-absent id counts as a successful delete
        if response.status() == StatusCode::NOT_FOUND {
            debug!(id = id, "Delete of absent id treated as success");
            return Ok(());
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::from_status(status, &body));
        }

        info!(id = id, "Media item deleted");
        Ok(())
    }
}
