use thiserror::Error;

/// Request never produced a response. Messages never include the request URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum RegistrarError {
    #[error("Invalid base host {base_host:?}: {reason}")]
    InvalidBaseHost { base_host: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, RegistrarError>;
