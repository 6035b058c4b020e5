mod dates;
pub mod serde_helpers;
mod text;

pub use dates::{day_key, parse_order_date};
pub use text::{matches_query, normalize_text};
