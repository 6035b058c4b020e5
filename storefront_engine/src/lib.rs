//! Storefront Engine
//!
//! The storefront engine holds the logic that sits between a shopper's cart, the order backend and the admin
//! console. It is transport-agnostic: every piece of I/O goes through one of the collaborator traits in
//! [`mod@traits`], so the same code runs against `reqwest` in the CLI and against scripted fakes in tests.
//!
//! The library is divided into these sections:
//! 1. The cart ([`mod@cart`]). Persists and mutates the shopping cart through an injected key-value store.
//! 2. Orders ([`mod@orders`]). Turns a cart into an order payload, submits it, and derives order totals and the
//!    high-value classification shared by the admin views.
//! 3. Admin views ([`mod@admin`]). The order reconciler (search, high-value filter, selection and status edits),
//!    the sales statistics read-model and the per-customer aggregates view.
//! 4. Feeds ([`mod@feeds`]). Periodic pollers for the order-notification and dead-letter feeds.
//! 5. The REST client ([`mod@api`]). Maps the backend endpoints onto domain types and normalises every failure
//!    into one of the [`errors`] kinds at the boundary.
//!
//! Sessions ([`mod@session`]) persist the signed-in user and provide the auth headers used by the REST client.
pub mod admin;
pub mod api;
pub mod cart;
pub mod errors;
pub mod feeds;
pub mod helpers;
pub mod orders;
pub mod session;
pub mod store_types;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use admin::{AggregatesView, OrderAdminReconciler, SalesStats, StatsAggregator, StatsView};
pub use api::StorefrontApi;
pub use cart::CartStore;
pub use errors::{ApiError, ParseError, TransportError, ValidationError};
pub use feeds::{DeadLetterFeed, FeedPoller, FeedSnapshot, FeedSource, FeedStatus, NotificationFeed, PollerHandle};
pub use orders::{HighValueIds, OrderPayload, OrderSubmissionService, HIGH_VALUE_THRESHOLD};
pub use session::{Role, SessionAuth, SessionStore, SessionUser};
