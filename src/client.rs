//! Item-database service client.
//!
//! Blocking reqwest client for the community item service: the bulk
//! ingestion endpoint used by the pipeline, plus the read path the
//! rest of the product shares with it (paginated listing, serial
//! decoding, single-item submission).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config;
use crate::pipeline::traits::SerialSink;
use crate::pipeline::types::SerialBatch;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("could not reach the item service at {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("http transport error: {0}")]
    Transport(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    BadBody(String),
}

/// Remote-reported accounting for one bulk submission.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BulkCounts {
    pub succeeded: u64,
    pub failed: u64,
}

/// One catalogued item, as the listing endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub serial: String,
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub weapon_type: Option<String>,
    pub element: Option<String>,
    pub rarity: Option<String>,
    pub level: Option<u32>,
    pub verification_status: String,
}

/// One page of the item catalogue.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartInfo {
    pub index: u32,
    pub name: Option<String>,
    pub category: Option<String>,
}

/// Structured decode of a single serial.
#[derive(Debug, Clone, Deserialize)]
pub struct DecodedItem {
    pub serial: String,
    pub item_type: String,
    pub item_type_name: String,
    pub manufacturer: Option<String>,
    pub weapon_type: Option<String>,
    pub element: Option<String>,
    pub rarity: Option<String>,
    pub level: Option<u32>,
    pub parts: Vec<PartInfo>,
}

/// Result of a single-item submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    /// The service already knows this serial (HTTP 409), which is not a failure.
    AlreadyKnown,
}

// Request bodies

#[derive(Serialize)]
struct BulkItem<'a> {
    serial: &'a str,
    source: &'a str,
}

#[derive(Serialize)]
struct BulkRequest<'a> {
    items: Vec<BulkItem<'a>>,
}

#[derive(Serialize)]
struct DecodeRequest<'a> {
    serial: &'a str,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    serial: &'a str,
    name: Option<&'a str>,
    source: &'a str,
}

/// HTTP client for the item-database service.
pub struct ItemsClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl ItemsClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(config::REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Client against the configured endpoint (env override honored).
    pub fn from_env() -> Self {
        Self::new(&config::api_base())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a whole batch of serials in one request.
    pub fn bulk_upload(&self, batch: &SerialBatch) -> Result<BulkCounts, ClientError> {
        let url = format!("{}/items/bulk", self.base_url);
        debug!(count = batch.serials.len(), %url, "bulk upload");

        let body = BulkRequest {
            items: batch
                .serials
                .iter()
                .map(|serial| BulkItem {
                    serial,
                    source: &batch.source,
                })
                .collect(),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<BulkCounts>()
            .map_err(|e| ClientError::BadBody(e.to_string()))
    }

    /// Fetch one page of the item catalogue.
    pub fn list_items(&self, limit: u32, offset: u32) -> Result<ItemPage, ClientError> {
        let url = format!("{}/items?limit={limit}&offset={offset}", self.base_url);
        debug!(%url, "list items");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<ItemPage>()
            .map_err(|e| ClientError::BadBody(e.to_string()))
    }

    /// Decode a single serial into its structured description.
    pub fn decode_serial(&self, serial: &str) -> Result<DecodedItem, ClientError> {
        let url = format!("{}/decode", self.base_url);
        debug!(%url, "decode serial");

        let response = self
            .client
            .post(&url)
            .json(&DecodeRequest { serial })
            .send()
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<DecodedItem>()
            .map_err(|e| ClientError::BadBody(e.to_string()))
    }

    /// Submit one serial, optionally named. A 409 means the service
    /// already has it and is reported as `AlreadyKnown`, not an error.
    pub fn submit_item(
        &self,
        serial: &str,
        name: Option<&str>,
    ) -> Result<SubmitOutcome, ClientError> {
        let url = format!("{}/items", self.base_url);
        debug!(%url, "submit item");

        let response = self
            .client
            .post(&url)
            .json(&SubmitRequest {
                serial,
                name: name.filter(|n| !n.trim().is_empty()),
                source: config::MANUAL_SUBMIT_SOURCE,
            })
            .send()
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(SubmitOutcome::Accepted);
        }
        if status.as_u16() == 409 {
            return Ok(SubmitOutcome::AlreadyKnown);
        }

        let body = response.text().unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn map_transport(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl SerialSink for ItemsClient {
    fn submit_batch(&self, batch: &SerialBatch) -> Result<BulkCounts, ClientError> {
        self.bulk_upload(batch)
    }
}
