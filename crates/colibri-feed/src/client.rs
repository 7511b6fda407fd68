//! HTTP client for the Colibri product-feed API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FeedError;
use crate::record::{DetailResponse, PriceStockUpdate, RawRecord};
use crate::retry::retry_with_backoff;
use crate::ProductFeed;

/// Client for the Colibri product export endpoints.
///
/// Exposes the paged export (`/api/productos`), the unpaged full export, and
/// the per-code detail lookup (`/api/producto-detalles`). Transport failures
/// are retried with exponential backoff; decode failures and unexpected
/// statuses are not.
pub struct ColibriClient {
    client: Client,
    base_url: String,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl ColibriClient {
    /// Creates a `ColibriClient` with a fixed request timeout and retry policy.
    ///
    /// `max_retries` is the number of additional attempts after the first
    /// failure for transport errors. Set to `0` to disable retries.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`FeedError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, FeedError> {
        reqwest::Url::parse(base_url).map_err(|e| FeedError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds the paged products URL, omitting paging params entirely for the
    /// full export.
    fn products_url(&self, page: Option<(u64, u32)>) -> Result<String, FeedError> {
        let base = format!("{}/api/productos", self.base_url);
        let mut url = reqwest::Url::parse(&base).map_err(|e| FeedError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        if let Some((offset, limit)) = page {
            url.query_pairs_mut()
                .append_pair("offset", &offset.to_string())
                .append_pair("limit", &limit.to_string());
        }

        Ok(url.to_string())
    }

    fn detail_url(&self, unique_code: &str) -> Result<String, FeedError> {
        let base = format!("{}/api/producto-detalles", self.base_url);
        let mut url = reqwest::Url::parse(&base).map_err(|e| FeedError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("codigo_unico", unique_code);
        Ok(url.to_string())
    }

    /// GETs `url` and decodes the body as `T`, with retry on transport errors.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        context: &str,
    ) -> Result<T, FeedError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                let status = response.status();

                if !status.is_success() {
                    return Err(FeedError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| FeedError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

#[async_trait]
impl ProductFeed for ColibriClient {
    /// Fetches one page of the product export.
    ///
    /// An empty array is a normal response meaning the offset is past the end
    /// of the feed.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`] — network or timeout failure after all retries.
    /// - [`FeedError::UnexpectedStatus`] — non-2xx status (not retried).
    /// - [`FeedError::Deserialize`] — body is not a JSON array of records.
    async fn fetch_page(&self, offset: u64, limit: u32) -> Result<Vec<RawRecord>, FeedError> {
        let url = self.products_url(Some((offset, limit)))?;
        tracing::debug!(offset, limit, "fetching feed page");
        let records: Vec<RawRecord> = self
            .get_json(url, &format!("products page at offset {offset}"))
            .await?;
        tracing::debug!(offset, count = records.len(), "feed page received");
        Ok(records)
    }

    /// Fetches the entire export in one call (full-sweep mode).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`fetch_page`](Self::fetch_page).
    async fn fetch_all(&self) -> Result<Vec<RawRecord>, FeedError> {
        let url = self.products_url(None)?;
        let records: Vec<RawRecord> = self.get_json(url, "full product export").await?;
        tracing::debug!(count = records.len(), "full feed received");
        Ok(records)
    }

    /// Fetches current price and stock for one unique code.
    ///
    /// # Errors
    ///
    /// In addition to the transport/decode failures of
    /// [`fetch_page`](Self::fetch_page), returns
    /// [`FeedError::InvalidPayload`] when the response lacks the required
    /// `PRECIO_NORMAL` or `STOCK` fields.
    async fn fetch_detail(&self, unique_code: &str) -> Result<PriceStockUpdate, FeedError> {
        let url = self.detail_url(unique_code)?;
        let detail: DetailResponse = self
            .get_json(url, &format!("product detail for {unique_code}"))
            .await?;
        detail.into_update().map_err(|reason| FeedError::InvalidPayload {
            context: format!("product detail for {unique_code}"),
            reason,
        })
    }
}
