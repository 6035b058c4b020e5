use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Could not initialize the HTTP client: {0}")]
    Initialization(String),
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Could not prepare the data directory {path}: {reason}")]
    DataDirectory { path: String, reason: String },
}
