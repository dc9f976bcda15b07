//! Network layer: where the "fetch data" sub-step gets its items from.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{ItemsResponse, ITEMS_ROUTE};
use tracing::{debug, info};
use url::Url;

use crate::{error::FetchError, mocking::MockSettings};

#[async_trait]
pub trait ItemsSource: Send + Sync {
    async fn fetch_items(&self) -> Result<ItemsResponse, FetchError>;
}

#[async_trait]
impl<S: ItemsSource + ?Sized> ItemsSource for std::sync::Arc<S> {
    async fn fetch_items(&self) -> Result<ItemsResponse, FetchError> {
        (**self).fetch_items().await
    }
}

pub struct HttpItemsSource {
    http: Client,
    endpoint: Url,
}

impl HttpItemsSource {
    pub fn new(server_url: &str) -> Result<Self, FetchError> {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: &str) -> Result<Self, FetchError> {
        let raw = format!("{}{ITEMS_ROUTE}", server_url.trim().trim_end_matches('/'));
        let endpoint = Url::parse(&raw).map_err(|source| FetchError::InvalidUrl {
            url: server_url.to_string(),
            source,
        })?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ItemsSource for HttpItemsSource {
    async fn fetch_items(&self) -> Result<ItemsResponse, FetchError> {
        debug!(endpoint = %self.endpoint, "requesting items");
        let response = self.http.get(self.endpoint.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16(), &body));
        }
        let items: ItemsResponse =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;
        info!(count = items.items.len(), "items received");
        Ok(items)
    }
}

/// In-process stand-in for the items endpoint, driven by [`MockSettings`].
pub struct MockItemsSource {
    settings: MockSettings,
    requests: AtomicUsize,
}

impl MockItemsSource {
    pub fn new(settings: MockSettings) -> Self {
        Self {
            settings,
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests served so far, failed ones included.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemsSource for MockItemsSource {
    async fn fetch_items(&self) -> Result<ItemsResponse, FetchError> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(request, latency_ms = self.settings.latency.as_millis() as u64, "mock items request");
        if !self.settings.latency.is_zero() {
            tokio::time::sleep(self.settings.latency).await;
        }
        if self.settings.fail_fetch {
            return Err(FetchError::Mocked(format!(
                "request {request} rejected by mock settings"
            )));
        }
        Ok(ItemsResponse::now(self.settings.items.clone()))
    }
}

#[cfg(test)]
#[path = "tests/network_tests.rs"]
mod tests;
