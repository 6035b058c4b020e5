use log::*;

use crate::{api::StorefrontApi, store_types::AggregateRecord, traits::HttpTransport};

impl AggregateRecord {
    /// The query that shows this customer's orders in the order view.
    pub fn search_query(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }
}

/// Per-customer order rollups, refreshed on demand. Like the feeds, a failed refresh keeps the last good records.
#[derive(Debug)]
pub struct AggregatesView<T> {
    api: StorefrontApi<T>,
    records: Vec<AggregateRecord>,
    loading: bool,
    error: Option<String>,
}

impl<T: HttpTransport> AggregatesView<T> {
    pub fn new(api: StorefrontApi<T>) -> Self {
        Self { api, records: Vec::new(), loading: false, error: None }
    }

    pub async fn refresh(&mut self) {
        self.loading = true;
        self.error = None;
        match self.api.fetch_aggregates().await {
            Ok(records) => {
                debug!("📊️ {} customer aggregates", records.len());
                self.records = records;
            },
            Err(e) => {
                warn!("📊️ Could not load customer aggregates. {e}");
                self.error = Some(e.to_string());
            },
        }
        self.loading = false;
    }

    pub fn records(&self) -> &[AggregateRecord] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
