//! Conversion wire contract

use serde::{Deserialize, Serialize};

/// A request to convert an uploaded slide deck
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub bucket_name: String,
    pub file_key: String,
    pub file_name: String,
}

/// The converter's reply: an HTTP-style status and a pre-serialized body
/// that the bridge passes through without reinterpretation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub status_code: u16,
    pub body: String,
}

/// Validation failure for an incoming request body
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Request body is required")]
    EmptyBody,
    #[error("Request body is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),
    #[error("bucketName, fileKey, and fileName are required")]
    MissingFields,
}

impl ConvertRequest {
    /// Parse and validate a raw request body. All three fields are
    /// required and must be non-empty; there are no defaults.
    pub fn from_body(body: &[u8]) -> Result<Self, RequestError> {
        if body.is_empty() {
            return Err(RequestError::EmptyBody);
        }

        #[derive(Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct Raw {
            bucket_name: Option<String>,
            file_key: Option<String>,
            file_name: Option<String>,
        }

        let raw: Raw = serde_json::from_slice(body).map_err(RequestError::InvalidJson)?;
        match (raw.bucket_name, raw.file_key, raw.file_name) {
            (Some(bucket_name), Some(file_key), Some(file_name))
                if !bucket_name.is_empty() && !file_key.is_empty() && !file_name.is_empty() =>
            {
                Ok(Self {
                    bucket_name,
                    file_key,
                    file_name,
                })
            }
            _ => Err(RequestError::MissingFields),
        }
    }
}
