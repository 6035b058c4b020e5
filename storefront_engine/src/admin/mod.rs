//! Admin views
//!
//! The order reconciler, the sales statistics derived from the same order list, and the per-customer aggregates.
//! None of these share mutable state: each holds its own snapshot and replaces it wholesale on refresh.
mod aggregates;
mod reconciler;
mod stats;

pub use aggregates::AggregatesView;
pub use reconciler::{matches_order, OrderAdminReconciler};
pub use stats::{DailyRevenue, ProductSales, SalesStats, StatsAggregator, StatsView, HISTOGRAM_DAYS};
