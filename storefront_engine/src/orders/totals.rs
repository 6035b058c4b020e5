use shop_common::Money;

use crate::store_types::Order;

/// The monetary total of an order.
///
/// The backend's own total wins whenever it is present. `totalPrice` is read first and `total` only when `totalPrice`
/// was not sent; see [`Order::explicit_total`]. Records without a usable total are totalled from their lines as
/// `Σ quantity × unit price`, exactly, with no intermediate rounding. An order without lines totals zero.
///
/// Returns `None` only when the line sum cannot be represented.
pub fn total_of(order: &Order) -> Option<Money> {
    if let Some(total) = order.explicit_total() {
        return Some(total);
    }
    order.items.iter().try_fold(Money::ZERO, |acc, line| {
        line.unit_price_or_zero().checked_mul_qty(line.quantity_or_zero()).and_then(|l| acc.checked_add(l))
    })
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn order(value: serde_json::Value) -> Order {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn explicit_totals_win() {
        let o = order(json!({"id": 1, "totalPrice": 99, "total": 5, "items": [{"quantity": 1, "unitPrice": 1}]}));
        assert_eq!(total_of(&o), Some(Money::from(99)));
        let o = order(json!({"id": 1, "totalPrice": null, "total": "12.30"}));
        assert_eq!(total_of(&o), Some("12.3".parse().unwrap()));
        let o = order(json!({"id": 1, "total": "12.30"}));
        assert_eq!(total_of(&o), Some("12.3".parse().unwrap()));
        let o = order(json!({"id": 1, "totalPrice": 0}));
        assert_eq!(total_of(&o), Some(Money::ZERO));
    }

    #[test]
    fn a_blank_total_price_shadows_total() {
        let o = order(json!({"id": 3, "totalPrice": "", "total": 900, "items": []}));
        assert_eq!(total_of(&o), Some(Money::ZERO));
        let o = order(json!({"id": 3, "totalPrice": " ", "total": 900, "items": [{"quantity": 2, "unitPrice": 15}]}));
        assert_eq!(total_of(&o), Some(Money::from(30)));
        let o = order(json!({"id": 3, "totalPrice": "n/a", "total": 900}));
        assert_eq!(total_of(&o), Some(Money::ZERO));
    }

    #[test]
    fn line_sums() {
        let o = order(json!({"id": 7, "totalPrice": null, "items": [{"quantity": 3, "unitPrice": 200}]}));
        assert_eq!(total_of(&o), Some(Money::from(600)));
        let o = order(json!({"id": 7, "items": [
            {"quantity": 3, "unitPrice": "0.1"},
            {"quantity": 2, "price": 19.99},
            {"unitPrice": 1000},
            {"quantity": 4}
        ]}));
        assert_eq!(total_of(&o), Some("40.28".parse().unwrap()));
    }

    #[test]
    fn nothing_to_sum_is_zero() {
        assert_eq!(total_of(&order(json!({"id": 1}))), Some(Money::ZERO));
        assert_eq!(total_of(&order(json!({"id": 1, "items": "nope"}))), Some(Money::ZERO));
    }
}
