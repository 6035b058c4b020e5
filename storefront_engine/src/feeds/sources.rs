use std::{fmt::Debug, future::Future, time::Duration};

use crate::{
    api::StorefrontApi,
    errors::ApiError,
    store_types::{DeadLetterItem, NotificationItem},
    traits::HttpTransport,
};

pub const NOTIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(8);
pub const DEAD_LETTER_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// A server-side list that can be read in full and cleared.
pub trait FeedSource: Send + Sync + 'static {
    type Item: Clone + Debug + Send + Sync + 'static;

    /// Short name for log messages.
    fn name(&self) -> &'static str;

    fn interval(&self) -> Duration;

    fn fetch(&self) -> impl Future<Output = Result<Vec<Self::Item>, ApiError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// `GET /notifications/orders`, cleared with `DELETE`.
#[derive(Debug, Clone)]
pub struct NotificationFeed<T> {
    api: StorefrontApi<T>,
}

impl<T: HttpTransport> NotificationFeed<T> {
    pub fn new(api: StorefrontApi<T>) -> Self {
        Self { api }
    }
}

impl<T: HttpTransport> FeedSource for NotificationFeed<T> {
    type Item = NotificationItem;

    fn name(&self) -> &'static str {
        "order notifications"
    }

    fn interval(&self) -> Duration {
        NOTIFICATION_POLL_INTERVAL
    }

    async fn fetch(&self) -> Result<Vec<NotificationItem>, ApiError> {
        self.api.fetch_notifications().await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.api.clear_notifications().await
    }
}

/// `GET /deadletters`, cleared with `POST /deadletters/clear`.
#[derive(Debug, Clone)]
pub struct DeadLetterFeed<T> {
    api: StorefrontApi<T>,
}

impl<T: HttpTransport> DeadLetterFeed<T> {
    pub fn new(api: StorefrontApi<T>) -> Self {
        Self { api }
    }
}

impl<T: HttpTransport> FeedSource for DeadLetterFeed<T> {
    type Item = DeadLetterItem;

    fn name(&self) -> &'static str {
        "dead letters"
    }

    fn interval(&self) -> Duration {
        DEAD_LETTER_POLL_INTERVAL
    }

    async fn fetch(&self) -> Result<Vec<DeadLetterItem>, ApiError> {
        self.api.fetch_dead_letters().await
    }

    async fn clear(&self) -> Result<(), ApiError> {
        self.api.clear_dead_letters().await
    }
}
