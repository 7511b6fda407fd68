//! HTTP client for the Colibri sales/voucher ledger.

use std::time::Duration;

use reqwest::{Client, StatusCode};

use crate::error::LedgerError;
use crate::types::{SalePayload, Voucher, VoucherPayload, VoucherState, VoucherStatusUpdate};

/// Client for the ledger endpoints: sale registration, stock checks, and the
/// voucher (gift-card) lifecycle.
///
/// All calls are synchronous request/response with a fixed timeout; the
/// ledger is never retried — callers decide whether a failure is fatal
/// (checkout) or merely annotated (order sync).
pub struct LedgerClient {
    client: Client,
    base_url: String,
}

impl LedgerClient {
    /// Creates a `LedgerClient` with a fixed request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidBaseUrl`] if `base_url` does not parse,
    /// or [`LedgerError::Http`] if the underlying client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, LedgerError> {
        reqwest::Url::parse(base_url).map_err(|e| LedgerError::InvalidBaseUrl {
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
        })
    }

    /// Registers a completed sale (`POST /createSale`).
    ///
    /// Returns the ledger's response body on 200/201 — callers surface it as
    /// an order annotation.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnexpectedStatus`] for any other status, with
    /// the response body preserved for the annotation.
    pub async fn create_sale(&self, sale: &SalePayload) -> Result<String, LedgerError> {
        let url = format!("{}/createSale", self.base_url);
        let response = self.client.post(&url).json(sale).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::OK || status == StatusCode::CREATED {
            Ok(body)
        } else {
            Err(LedgerError::UnexpectedStatus {
                status: status.as_u16(),
                url,
                body,
            })
        }
    }

    /// Checks available stock for a SKU (`GET /checkStock?sku=`).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on transport failures or malformed payloads.
    /// The pre-checkout verification treats any error as zero stock.
    pub async fn check_stock(&self, sku: &str) -> Result<i64, LedgerError> {
        let mut url = reqwest::Url::parse(&format!("{}/checkStock", self.base_url)).map_err(
            |e| LedgerError::InvalidBaseUrl {
                base_url: self.base_url.clone(),
                reason: e.to_string(),
            },
        )?;
        url.query_pairs_mut().append_pair("sku", sku);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LedgerError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        #[derive(serde::Deserialize)]
        struct StockResponse {
            #[serde(default)]
            stock: i64,
        }

        let parsed: StockResponse =
            serde_json::from_str(&body).map_err(|e| LedgerError::Deserialize {
                context: format!("stock check for {sku}"),
                source: e,
            })?;
        Ok(parsed.stock)
    }

    /// Creates a voucher (`POST /api/vales`). The ledger answers 201 with the
    /// created voucher.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnexpectedStatus`] on any other status.
    pub async fn create_voucher(&self, voucher: &VoucherPayload) -> Result<Voucher, LedgerError> {
        let url = format!("{}/api/vales", self.base_url);
        tracing::debug!(correlative = %voucher.correlative, "creating voucher");

        let response = self.client.post(&url).json(voucher).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::CREATED {
            return Err(LedgerError::UnexpectedStatus {
                status: status.as_u16(),
                url,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| LedgerError::Deserialize {
            context: format!("created voucher {}", voucher.correlative),
            source: e,
        })
    }

    /// Fetches a voucher by correlative (`GET /api/vales/{correlativo}`).
    ///
    /// Returns `Ok(None)` when the ledger reports 404.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnexpectedStatus`] for other non-2xx statuses.
    pub async fn get_voucher(&self, correlative: &str) -> Result<Option<Voucher>, LedgerError> {
        let url = self.voucher_url(correlative, None)?;

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(LedgerError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let voucher = serde_json::from_str(&body).map_err(|e| LedgerError::Deserialize {
            context: format!("voucher {correlative}"),
            source: e,
        })?;
        Ok(Some(voucher))
    }

    /// Updates a voucher's state (`PUT /api/vales/{correlativo}/status`).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnexpectedStatus`] on non-2xx statuses.
    pub async fn update_voucher_status(
        &self,
        correlative: &str,
        new_state: VoucherState,
        reason: &str,
        user: &str,
    ) -> Result<(), LedgerError> {
        let url = self.voucher_url(correlative, Some("status"))?;
        let payload = VoucherStatusUpdate {
            new_state,
            reason: reason.to_owned(),
            user: user.to_owned(),
        };

        let response = self.client.put(url.clone()).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            return Err(LedgerError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        tracing::debug!(correlative, state = ?new_state, "voucher status updated");
        Ok(())
    }

    /// Builds `/api/vales/{correlativo}[/suffix]` with the correlative
    /// percent-encoded as a path segment.
    fn voucher_url(
        &self,
        correlative: &str,
        suffix: Option<&str>,
    ) -> Result<reqwest::Url, LedgerError> {
        let mut url = reqwest::Url::parse(&format!("{}/api/vales/", self.base_url)).map_err(
            |e| LedgerError::InvalidBaseUrl {
                base_url: self.base_url.clone(),
                reason: e.to_string(),
            },
        )?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                LedgerError::InvalidBaseUrl {
                    base_url: self.base_url.clone(),
                    reason: "base URL cannot carry path segments".to_owned(),
                }
            })?;
            segments.pop_if_empty().push(correlative);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voucher_url_encodes_the_correlative() {
        let client = LedgerClient::new("https://ledger.example.com", 5).unwrap();
        let url = client.voucher_url("WEB GC/1", Some("status")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://ledger.example.com/api/vales/WEB%20GC%2F1/status"
        );
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        assert!(matches!(
            LedgerClient::new("not a url", 5),
            Err(LedgerError::InvalidBaseUrl { .. })
        ));
    }
}
