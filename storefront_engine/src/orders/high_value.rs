use std::collections::HashSet;

use serde_json::Value;
use shop_common::Money;

use crate::{
    helpers::serde_helpers::int_from_value,
    orders::total_of,
    store_types::{Order, OrderId},
};

/// Orders at or above this amount are high-value regardless of what the backend reports.
pub const HIGH_VALUE_THRESHOLD: Money = Money::from_units(500);

/// The order ids the backend flags as high-value. Replaced wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighValueIds(HashSet<OrderId>);

impl HighValueIds {
    /// Reads the `/orders/high-value` feed. Entries are bare ids or objects with `orderId` (preferred) or `id`;
    /// anything else is skipped. A non-array feed is empty.
    pub fn from_feed(value: &Value) -> Self {
        let Value::Array(entries) = value else {
            return Self::default();
        };
        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(obj) => obj
                    .get("orderId")
                    .filter(|v| !v.is_null())
                    .or_else(|| obj.get("id"))
                    .and_then(int_from_value),
                other => int_from_value(other),
            })
            .map(OrderId)
            .collect()
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrderId> {
        self.0.iter()
    }
}

impl FromIterator<OrderId> for HighValueIds {
    fn from_iter<I: IntoIterator<Item = OrderId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// An order is high-value when the backend says so *or* its total reaches `threshold`. Either signal is enough.
pub fn is_high_value(order: &Order, server_ids: &HighValueIds, threshold: Money) -> bool {
    server_ids.contains(order.id) || total_of(order).map(|t| t >= threshold).unwrap_or(false)
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn order(value: serde_json::Value) -> Order {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn threshold_alone_is_enough() {
        let o = order(json!({"id": 7, "totalPrice": null, "items": [{"quantity": 3, "unitPrice": 200}]}));
        assert!(is_high_value(&o, &HighValueIds::default(), HIGH_VALUE_THRESHOLD));
        let o = order(json!({"id": 7, "total": 500}));
        assert!(is_high_value(&o, &HighValueIds::default(), HIGH_VALUE_THRESHOLD));
    }

    #[test]
    fn server_flag_alone_is_enough() {
        let o = order(json!({"id": 8, "total": 20}));
        let ids = [OrderId(8)].into_iter().collect::<HighValueIds>();
        assert!(is_high_value(&o, &ids, HIGH_VALUE_THRESHOLD));
    }

    #[test]
    fn neither_signal() {
        let o = order(json!({"id": 9, "total": "499.99"}));
        let ids = [OrderId(8)].into_iter().collect::<HighValueIds>();
        assert!(!is_high_value(&o, &ids, HIGH_VALUE_THRESHOLD));
        assert!(!is_high_value(&order(json!({"id": 9})), &ids, HIGH_VALUE_THRESHOLD));
        let blank = order(json!({"id": 3, "totalPrice": "", "total": 900, "items": []}));
        assert!(!is_high_value(&blank, &ids, HIGH_VALUE_THRESHOLD));
    }

    #[test]
    fn feed_parsing() {
        let ids = HighValueIds::from_feed(&json!([1, "2", {"orderId": null, "id": 3}, {"orderId": 4, "id": 40}, true]));
        let mut sorted = ids.iter().map(|id| id.value()).collect::<Vec<_>>();
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4]);
        assert!(HighValueIds::from_feed(&json!({"ids": [1]})).is_empty());
    }
}
