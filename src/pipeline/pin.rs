//! Pinning: upload a document to Pinata and get its IPFS content identifier.
//!
//! Uses the `pinFileToIPFS` endpoint with a multipart body. Every request has
//! a bounded timeout and failures are split into timeout, transport and
//! service rejection so callers and logs can tell them apart. There is no
//! retry.

use crate::config::{PinataCredentials, ServiceConfig};
use crate::error::PinningError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// A document stored by the pinning service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedFile {
    /// Content identifier (IPFS hash).
    pub cid: String,
    pub filename: String,
    /// Size reported by the service, in bytes.
    pub size: u64,
}

/// One entry of the pin list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinRecord {
    pub cid: String,
    pub name: Option<String>,
    pub size: u64,
    pub date_pinned: Option<String>,
}

/// Stores documents and returns content identifiers.
#[async_trait]
pub trait Pinner: Send + Sync {
    async fn pin(&self, filename: &str, bytes: Bytes) -> Result<PinnedFile, PinningError>;

    /// Most recent pins, newest first.
    async fn list_pins(&self, limit: usize) -> Result<Vec<PinRecord>, PinningError>;
}

/// [`Pinner`] for the Pinata HTTP API.
#[derive(Debug, Clone)]
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    credentials: Option<PinataCredentials>,
    timeout: Duration,
}

#[derive(Deserialize)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
    #[serde(rename = "PinSize", default)]
    pin_size: u64,
}

#[derive(Deserialize)]
struct PinListResponse {
    #[serde(default)]
    rows: Vec<PinListRow>,
}

#[derive(Deserialize)]
struct PinListRow {
    ipfs_pin_hash: String,
    #[serde(default)]
    size: u64,
    date_pinned: Option<String>,
    metadata: Option<PinListMetadata>,
}

#[derive(Deserialize)]
struct PinListMetadata {
    name: Option<String>,
}

impl PinataClient {
    /// Create a client. `api_url` is the API root, e.g. `https://api.pinata.cloud`.
    pub fn new(
        api_url: impl Into<String>,
        credentials: Option<PinataCredentials>,
        timeout: Duration,
    ) -> Result<Self, PinningError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PinningError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            credentials,
            timeout,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, PinningError> {
        Self::new(
            config.pinata_api_url.clone(),
            config.pinata_credentials.clone(),
            Duration::from_secs(config.pin_timeout_secs),
        )
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, PinningError> {
        match &self.credentials {
            Some(PinataCredentials::KeyPair {
                api_key,
                secret_api_key,
            }) => Ok(request
                .header("pinata_api_key", api_key)
                .header("pinata_secret_api_key", secret_api_key)),
            Some(PinataCredentials::Jwt(token)) => Ok(request.bearer_auth(token)),
            None => Err(PinningError::MissingCredentials),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> PinningError {
        if e.is_timeout() {
            PinningError::Timeout {
                secs: self.timeout.as_secs(),
            }
        } else {
            PinningError::Transport(e.to_string())
        }
    }

    /// Send and return the body of a 2xx response, or the matching error.
    async fn send(&self, request: RequestBuilder) -> Result<Bytes, PinningError> {
        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.map_send_error(e))?;
        if !status.is_success() {
            return Err(PinningError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl Pinner for PinataClient {
    async fn pin(&self, filename: &str, bytes: Bytes) -> Result<PinnedFile, PinningError> {
        let url = format!("{}/pinning/pinFileToIPFS", self.api_url);
        let request = self.authorize(self.http.post(&url))?;

        let size = bytes.len();
        let file_part = Part::bytes(bytes.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| PinningError::Transport(e.to_string()))?;
        let metadata = serde_json::json!({ "name": filename }).to_string();
        let form = Form::new()
            .part("file", file_part)
            .text("pinataMetadata", metadata);

        debug!("Pinning '{}' ({} bytes)", filename, size);
        let body = self.send(request.multipart(form)).await?;

        let parsed: PinFileResponse = serde_json::from_slice(&body).map_err(|e| {
            PinningError::InvalidResponse(format!(
                "{e}: {}",
                String::from_utf8_lossy(&body)
            ))
        })?;
        if parsed.ipfs_hash.trim().is_empty() {
            return Err(PinningError::InvalidResponse("empty IpfsHash".into()));
        }

        info!("Pinned '{}' as {}", filename, parsed.ipfs_hash);
        Ok(PinnedFile {
            cid: parsed.ipfs_hash,
            filename: filename.to_string(),
            size: if parsed.pin_size > 0 {
                parsed.pin_size
            } else {
                size as u64
            },
        })
    }

    async fn list_pins(&self, limit: usize) -> Result<Vec<PinRecord>, PinningError> {
        let url = format!("{}/data/pinList", self.api_url);
        let request = self.authorize(self.http.get(&url))?.query(&[
            ("status", "pinned".to_string()),
            ("pageLimit", limit.to_string()),
        ]);

        let body = self.send(request).await?;
        let parsed: PinListResponse = serde_json::from_slice(&body)
            .map_err(|e| PinningError::InvalidResponse(e.to_string()))?;

        Ok(parsed
            .rows
            .into_iter()
            .map(|row| PinRecord {
                cid: row.ipfs_pin_hash,
                name: row.metadata.and_then(|m| m.name),
                size: row.size,
                date_pinned: row.date_pinned,
            })
            .collect())
    }
}
