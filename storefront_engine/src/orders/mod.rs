//! Orders
//!
//! Everything between "the shopper clicks confirm" and "the admin decides whether an order needs attention":
//! building the payload from a cart, submitting it, computing order totals, and the hybrid high-value rule.
mod high_value;
mod history;
mod order_builder;
mod submission;
mod totals;

pub use high_value::{is_high_value, HighValueIds, HIGH_VALUE_THRESHOLD};
pub use history::{my_orders, orders_for_user};
pub use order_builder::{build_payload, OrderPayload, PayloadLine, INITIAL_ORDER_STATUS};
pub use submission::OrderSubmissionService;
pub use totals::total_of;
