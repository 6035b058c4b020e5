//! Concrete collaborators for the storefront engine.
//!
//! * [`ReqwestTransport`] performs HTTP exchanges with `reqwest`.
//! * [`FileStore`] persists the cart and session as JSON files in a data directory.
//! * [`ClientConfig`] reads the backend URL, data directory and credentials from the environment.
mod config;
mod error;
mod file_store;
mod transport;

pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
pub use error::ClientError;
pub use file_store::FileStore;
pub use transport::ReqwestTransport;
