//! Configuration types and loading

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Attachment upload limits
    pub upload: UploadConfig,

    /// Conversion service configuration
    pub converter: ConverterConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Default limits applied to a conversation's attachments. A caller may
/// still supply its own limit per context (e.g., per selected model).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    /// Maximum number of attachments per message
    pub max_file_count: usize,
    /// Maximum size of a single attachment in bytes
    pub max_file_size_bytes: u64,
    /// Accepted kind patterns: exact MIME, `type/*`, or `.ext`
    pub accepted_kinds: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConverterConfig {
    /// Endpoint of the slide-deck conversion service
    pub endpoint: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            upload: UploadConfig {
                max_file_count: 5,
                max_file_size_bytes: 10 * 1024 * 1024, // 10MB
                accepted_kinds: vec![
                    "image/*".to_string(),
                    "video/*".to_string(),
                    "application/pdf".to_string(),
                    ".pptx".to_string(),
                    ".docx".to_string(),
                    ".xlsx".to_string(),
                    ".csv".to_string(),
                    ".txt".to_string(),
                    ".md".to_string(),
                ],
            },
            converter: ConverterConfig {
                endpoint: "http://127.0.0.1:9090/convert".to_string(),
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            config.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: "expected a port number".into(),
            })?;
        }

        if let Ok(count) = std::env::var("CONVOY_MAX_FILE_COUNT") {
            config.upload.max_file_count =
                count.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "CONVOY_MAX_FILE_COUNT".into(),
                    message: "expected an integer".into(),
                })?;
        }
        if let Ok(size) = std::env::var("CONVOY_MAX_FILE_SIZE_BYTES") {
            config.upload.max_file_size_bytes =
                size.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "CONVOY_MAX_FILE_SIZE_BYTES".into(),
                    message: "expected a byte count".into(),
                })?;
        }
        if let Ok(kinds) = std::env::var("CONVOY_ACCEPTED_KINDS") {
            config.upload.accepted_kinds = kinds
                .split(',')
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }

        if let Ok(endpoint) = std::env::var("CONVOY_CONVERTER_ENDPOINT") {
            config.converter.endpoint = endpoint;
        }

        Ok(config)
    }

    /// Get the server address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        std::net::SocketAddr::new(ip, self.server.port)
    }
}
