use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Request/response failures. Every variant means "this refresh cycle
/// failed"; none is fatal.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    #[error("malformed response from {path}: {reason}")]
    MalformedResponse { path: String, reason: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
                path: err
                    .url()
                    .map(|url| url.path().to_string())
                    .unwrap_or_default(),
            };
        }
        if err.is_decode() {
            return Self::MalformedResponse {
                path: err
                    .url()
                    .map(|url| url.path().to_string())
                    .unwrap_or_default(),
                reason: err.to_string(),
            };
        }
        Self::Network(err.to_string())
    }
}

/// Inbound push payloads that cannot be decoded. The offending message is
/// dropped; nothing else is affected.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("message is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("message has no string 'type' field")]
    MissingKind,

    #[error("invalid body for '{kind}' message: {source}")]
    Body {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Push channel failures.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("cannot open channel to {url}: {reason}")]
    Construction { url: String, reason: String },

    #[error("handshake failed: {0}")]
    Handshake(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error("WebSocket error: {0}")]
    WebSocket(Box<tokio_tungstenite::tungstenite::Error>),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("sync runtime is not running")]
    RuntimeStopped,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(Box::new(err))
    }
}
