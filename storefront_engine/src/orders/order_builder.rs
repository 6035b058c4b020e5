use serde::{Deserialize, Serialize};
use shop_common::Money;

use crate::{
    errors::ValidationError,
    store_types::{CartItem, OrderStatus, ProductId, UserId},
};

/// Every order placed from the storefront starts out as `PENDING`.
pub const INITIAL_ORDER_STATUS: OrderStatus = OrderStatus::Pending;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadLine {
    pub perfume_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl PayloadLine {
    pub fn new(perfume_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self { perfume_id, quantity: quantity.max(1), unit_price }
    }
}

impl From<&CartItem> for PayloadLine {
    fn from(item: &CartItem) -> Self {
        Self::new(item.id, item.quantity, item.price)
    }
}

/// The body of `POST /orders`. Built once per submission and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    user_id: UserId,
    status: OrderStatus,
    items: Vec<PayloadLine>,
}

impl OrderPayload {
    pub fn new(user_id: UserId, items: Vec<PayloadLine>) -> Self {
        Self { user_id, status: INITIAL_ORDER_STATUS, items }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn status(&self) -> &OrderStatus {
        &self.status
    }

    pub fn items(&self) -> &[PayloadLine] {
        &self.items
    }
}

/// Turns a cart snapshot into an order payload, one line per cart item in cart order.
///
/// Fails when the cart is empty or nobody is signed in. Both checks happen here, before any request is made.
pub fn build_payload(user_id: Option<UserId>, items: &[CartItem]) -> Result<OrderPayload, ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::EmptyCart);
    }
    let user_id = user_id.ok_or(ValidationError::MissingUser)?;
    Ok(OrderPayload::new(user_id, items.iter().map(PayloadLine::from).collect()))
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn item(id: i64, price: i64, quantity: u32) -> CartItem {
        CartItem { quantity, ..CartItem::new(ProductId(id), format!("P{id}"), Money::from(price)) }
    }

    #[test]
    fn payload_mirrors_the_cart() {
        let cart = vec![item(1, 50, 2), item(2, 10, 1)];
        let payload = build_payload(Some(UserId(3)), &cart).unwrap();
        assert_eq!(payload.items().len(), 2);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            json!({
                "userId": 3,
                "status": "PENDING",
                "items": [
                    {"perfumeId": 1, "quantity": 2, "unitPrice": 50.0},
                    {"perfumeId": 2, "quantity": 1, "unitPrice": 10.0}
                ]
            })
        );
    }

    #[test]
    fn zero_quantities_are_sent_as_one() {
        let payload = build_payload(Some(UserId(3)), &[item(7, 5, 0)]).unwrap();
        assert_eq!(payload.items()[0].quantity, 1);
        assert_eq!(payload.items()[0].unit_price, Money::from(5));
    }

    #[test]
    fn preconditions() {
        assert_eq!(build_payload(Some(UserId(1)), &[]), Err(ValidationError::EmptyCart));
        assert_eq!(build_payload(None, &[item(1, 1, 1)]), Err(ValidationError::MissingUser));
        // an empty cart is reported first, like the checkout form does
        assert_eq!(build_payload(None, &[]), Err(ValidationError::EmptyCart));
    }
}
