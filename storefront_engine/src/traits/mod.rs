//! # Integration seams
//!
//! The engine never talks to a browser, a file system or a socket directly. Everything it needs from the outside
//! world is expressed by the traits in this module, so that the same reconciliation logic runs against a real
//! backend, a CLI data directory or an in-memory test double.
//!
//! * [`KeyValueStore`] is the durable per-user storage used for the cart and the session.
//! * [`AuthProvider`] supplies the credentials attached to every request.
//! * [`HttpTransport`] performs a single HTTP exchange with the backend.
mod auth_provider;
mod http_transport;
mod key_value_store;

pub use auth_provider::{AuthProvider, NoAuth};
pub use http_transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use key_value_store::{get_json, set_json, KeyValueStore};
