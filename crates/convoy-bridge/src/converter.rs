//! Converter service invocation

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::instrument;

use crate::model::ConvertRequest;

/// Converter invocation errors
#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("Converter request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Converter unavailable: {0}")]
    Unavailable(String),
}

pub type ConverterResult<T> = Result<T, ConverterError>;

/// The conversion service behind the bridge.
///
/// One request/response invocation per call; the bridge adds no retry or
/// timeout layer on top of the transport's own limits.
#[async_trait]
pub trait ConverterService: Send + Sync {
    /// Invoke the converter. `None` means it returned no payload at all.
    async fn invoke(&self, request: &ConvertRequest) -> ConverterResult<Option<Bytes>>;

    /// Service name for logging
    fn name(&self) -> &str;
}

/// Conversion service reached over HTTP
pub struct HttpConverter {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpConverter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ConverterService for HttpConverter {
    #[instrument(skip_all, fields(file_name = %request.file_name))]
    async fn invoke(&self, request: &ConvertRequest) -> ConverterResult<Option<Bytes>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await?;
        let payload = response.bytes().await?;
        if payload.is_empty() {
            Ok(None)
        } else {
            Ok(Some(payload))
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
