//! Feeds
//!
//! The admin console watches two server-side feeds, new-order notifications and dead letters, by polling them on
//! a fixed interval. Both are driven by the same [`FeedPoller`]; the feeds differ only in their [`FeedSource`].
//!
//! Each refresh replaces the poller's item list outright: a feed is what the server says it is *now*, not a delta.
//! A failed refresh records its error and keeps the last good items.
mod poller;
mod sources;

pub use poller::{FeedPoller, FeedSnapshot, FeedStatus, PollerHandle};
pub use sources::{
    DeadLetterFeed,
    FeedSource,
    NotificationFeed,
    DEAD_LETTER_POLL_INTERVAL,
    NOTIFICATION_POLL_INTERVAL,
};
