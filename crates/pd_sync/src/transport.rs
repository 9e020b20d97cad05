//! Network seam for the queue.  `HttpTransport` is the production
//! implementation; tests substitute their own.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;

use crate::{config::SyncConfig, error::SyncError, models::NewRequest};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue `request` once.
    ///
    /// Returns the HTTP status for any response, whatever its class.
    /// Returns `SyncError::Network` only when no response was received.
    async fn send(&self, request: &NewRequest) -> Result<u16, SyncError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self { client })
    }

    /// Always `Content-Type: application/json`; the body only when present.
    pub fn build_request(&self, request: &NewRequest) -> Result<reqwest::Request, SyncError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| SyncError::InvalidRequest(format!("bad method '{}'", request.method)))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }
        builder
            .build()
            .map_err(|e| SyncError::InvalidRequest(e.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &NewRequest) -> Result<u16, SyncError> {
        let req = self.build_request(request)?;
        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| SyncError::Network(e.without_url().to_string()))?;
        Ok(resp.status().as_u16())
    }
}
