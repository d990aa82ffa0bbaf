use thiserror::Error;

/// Errors raised by generated builders at run time
#[derive(Debug, Error)]
pub enum Error {
    #[error("A rest client has not been registered yet. You must call restclient::register_client first")]
    UnregisteredClient,

    /// JSON body encoding failed before the request was sent
    #[error("Failed to encode request body: {0}")]
    Encoding(#[source] serde_json::Error),

    /// Connection, timeout or DNS failure reported by reqwest
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header: {0}")]
    InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),

    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
