//! Domain records exchanged with the storefront backend.
//!
//! The backend's JSON is loosely shaped. Fields go missing, amounts arrive as strings, and the customer's email can
//! live in any of four places depending on which endpoint produced the record. These types absorb that looseness on
//! the way in and expose accessors that resolve the fallbacks in one place.
use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use shop_common::Money;

use crate::helpers::{
    parse_order_date,
    serde_helpers::{
        amount_field,
        amount_or_zero,
        int_from_value,
        loose_amount,
        loose_int,
        loose_list,
        loose_status,
        loose_string,
    },
};

//--------------------------------------     Identifiers     ---------------------------------------------------------
macro_rules! id_type {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().trim_start_matches('#').parse().map(Self)
            }
        }

        /// Accepts integers and numeric strings.
        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where D: Deserializer<'de> {
                let value = Value::deserialize(deserializer)?;
                int_from_value(&value)
                    .map(Self)
                    .ok_or_else(|| de::Error::custom(format!("{value} is not a valid {}", stringify!($name))))
            }
        }
    };
}

id_type!(OrderId, "#");
id_type!(ProductId, "");
id_type!(UserId, "");

//--------------------------------------     OrderStatus     ---------------------------------------------------------
/// The lifecycle state of an order. Statuses outside the known set are preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// The initial state of every order placed through the storefront.
    #[default]
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// The statuses an administrator can pick from, in workflow order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Other(s) => s.as_str(),
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "PAID" => Self::Paid,
            "PROCESSING" => Self::Processing,
            "SHIPPED" => Self::Shipped,
            "DELIVERED" => Self::Delivered,
            "CANCELLED" | "CANCELED" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Order status cannot be empty".to_string());
        }
        Ok(Self::from(s.to_string()))
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        String::deserialize(deserializer).map(Self::from)
    }
}

//--------------------------------------      CartItem       ---------------------------------------------------------
/// A product line in the shopper's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub price: Money,
    #[serde(default = "one", deserialize_with = "quantity_at_least_one")]
    pub quantity: u32,
}

fn one() -> u32 {
    1
}

/// Missing, zero or nonsensical quantities load as 1.
fn quantity_at_least_one<'de, D>(deserializer: D) -> Result<u32, D::Error>
where D: Deserializer<'de> {
    let q = loose_int(deserializer)?.unwrap_or(1);
    Ok(u32::try_from(q).ok().filter(|q| *q > 0).unwrap_or(1))
}

impl CartItem {
    pub fn new<S: Into<String>>(id: ProductId, name: S, price: Money) -> Self {
        Self { id, name: name.into(), brand: None, price, quantity: 1 }
    }

    pub fn with_brand<S: Into<String>>(mut self, brand: S) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn line_total(&self) -> Money {
        self.price * i64::from(self.quantity)
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// The catalogue entry an order line refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default, deserialize_with = "loose_int", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfume_id: Option<ProductId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfume: Option<ProductRef>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "loose_int", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "loose_amount", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    #[serde(default, deserialize_with = "loose_amount", skip_serializing_if = "Option::is_none")]
    pub price: Option<Money>,
}

impl OrderLine {
    /// The product this line sold: the nested product's id, then `perfumeId`, then the line's own id.
    /// Zero is treated as "no id".
    pub fn product_id(&self) -> Option<ProductId> {
        self.perfume
            .as_ref()
            .and_then(|p| p.id)
            .or(self.perfume_id)
            .or(self.id.map(ProductId))
            .filter(|id| id.0 != 0)
    }

    pub fn product_name(&self) -> Option<&str> {
        self.perfume.as_ref().and_then(|p| p.name.as_deref()).or(self.name.as_deref())
    }

    pub fn product_brand(&self) -> Option<&str> {
        self.perfume.as_ref().and_then(|p| p.brand.as_deref()).or(self.brand.as_deref())
    }

    pub fn quantity_or_zero(&self) -> i64 {
        self.quantity.unwrap_or_default()
    }

    /// `unitPrice`, then `price`, then zero.
    pub fn unit_price_or_zero(&self) -> Money {
        self.unit_price.or(self.price).unwrap_or_default()
    }
}

/// An amount field that may be missing, present without a usable value, or present with one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmountField {
    /// Not sent, or `null`.
    #[default]
    Absent,
    /// Sent as a blank or unparseable value.
    Unusable,
    Amount(Money),
}

impl AmountField {
    pub fn amount(&self) -> Option<Money> {
        match self {
            Self::Amount(m) => Some(*m),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Written back as the amount, or as an empty string when unusable.
impl Serialize for AmountField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Amount(m) => m.serialize(serializer),
            Self::Unusable => serializer.serialize_str(""),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

/// An order as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default, deserialize_with = "loose_status", skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "amount_field", skip_serializing_if = "AmountField::is_absent")]
    pub total_price: AmountField,
    #[serde(default, deserialize_with = "loose_amount", skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<OrderUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "loose_list")]
    pub items: Vec<OrderLine>,
}

impl Order {
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            status: None,
            order_date: None,
            created_at: None,
            total_price: AmountField::Absent,
            total: None,
            shipping_address: None,
            user: None,
            user_id: None,
            user_email: None,
            customer_email: None,
            email: None,
            items: Vec::new(),
        }
    }

    /// The status the backend gave, or `PENDING` when it gave none.
    pub fn status_or_default(&self) -> OrderStatus {
        self.status.clone().unwrap_or_default()
    }

    /// `totalPrice`, falling back to `total` only when `totalPrice` was not sent (or was `null`). A `totalPrice` that
    /// is blank or unparseable still shadows `total`, and the order has no explicit total.
    pub fn explicit_total(&self) -> Option<Money> {
        match self.total_price {
            AmountField::Absent => self.total,
            field => field.amount(),
        }
    }

    /// The customer's email, looked up on the nested user first and then on the flat fields.
    pub fn customer_email(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.email.as_deref())
            .or(self.user_email.as_deref())
            .or(self.customer_email.as_deref())
            .or(self.email.as_deref())
    }

    pub fn first_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.first_name.as_deref())
    }

    pub fn last_name(&self) -> Option<&str> {
        self.user.as_ref().and_then(|u| u.last_name.as_deref())
    }

    /// "First Last", or whichever half exists.
    pub fn customer_name(&self) -> Option<String> {
        match (self.first_name(), self.last_name()) {
            (Some(f), Some(l)) => Some(format!("{f} {l}")),
            (Some(n), None) | (None, Some(n)) => Some(n.to_string()),
            (None, None) => None,
        }
    }

    pub fn owner_id(&self) -> Option<UserId> {
        self.user.as_ref().and_then(|u| u.id).or(self.user_id)
    }

    /// `orderDate`, falling back to `createdAt`.
    pub fn placed_at_raw(&self) -> Option<&str> {
        self.order_date.as_deref().or(self.created_at.as_deref())
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at_raw().and_then(parse_order_date)
    }
}

//--------------------------------------    Feed records     ---------------------------------------------------------
/// A server-side event recorded when an order is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, deserialize_with = "loose_amount", skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(default, deserialize_with = "loose_status", skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// A message the backend gave up on processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetterItem {
    #[serde(rename = "type", default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// Per-customer order totals computed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRecord {
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, deserialize_with = "loose_int", skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(default, deserialize_with = "loose_amount", skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub last_created_at: Option<String>,
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn loose_order_parsing() {
        let order: Order = serde_json::from_value(json!({
            "id": "42",
            "status": "shipped",
            "totalPrice": "",
            "total": "120.50",
            "user": { "id": 7, "email": "ana@example.com", "firstName": "Ana" },
            "items": [
                { "perfume": { "id": 3, "name": "Noir" }, "quantity": 2, "unitPrice": 60.25 },
                "garbage"
            ]
        }))
        .unwrap();
        assert_eq!(order.id, OrderId(42));
        assert_eq!(order.status, Some(OrderStatus::Shipped));
        assert_eq!(order.total_price, AmountField::Unusable);
        assert_eq!(order.explicit_total(), None);
        assert_eq!(order.customer_email(), Some("ana@example.com"));
        assert_eq!(order.customer_name().as_deref(), Some("Ana"));
        assert_eq!(order.owner_id(), Some(UserId(7)));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id(), Some(ProductId(3)));
        assert_eq!(order.items[0].product_name(), Some("Noir"));
    }

    #[test]
    fn email_fallbacks() {
        let order: Order = serde_json::from_value(json!({"id": 1, "customerEmail": "c@x.io", "email": "e@x.io"})).unwrap();
        assert_eq!(order.customer_email(), Some("c@x.io"));
        let order: Order = serde_json::from_value(json!({"id": 1, "user": null, "email": "e@x.io"})).unwrap();
        assert_eq!(order.customer_email(), Some("e@x.io"));
        assert_eq!(order.status_or_default(), OrderStatus::Pending);
    }

    #[test]
    fn orders_without_an_id_are_rejected() {
        assert!(serde_json::from_value::<Order>(json!({"status": "PAID"})).is_err());
        assert!(serde_json::from_value::<Order>(json!({"id": "abc"})).is_err());
    }

    #[test]
    fn statuses() {
        assert_eq!(OrderStatus::from("paid".to_string()), OrderStatus::Paid);
        assert_eq!(OrderStatus::from("ON_HOLD".to_string()), OrderStatus::Other("ON_HOLD".into()));
        assert_eq!(OrderStatus::Other("ON_HOLD".into()).to_string(), "ON_HOLD");
        assert!("".parse::<OrderStatus>().is_err());
        assert_eq!(serde_json::to_string(&OrderStatus::Cancelled).unwrap(), r#""CANCELLED""#);
    }

    #[test]
    fn cart_items_are_sanitized_on_load() {
        let item: CartItem = serde_json::from_value(json!({"id": 5, "name": "Iris", "quantity": 0})).unwrap();
        assert_eq!(item.price, Money::ZERO);
        assert_eq!(item.quantity, 1);
        let item: CartItem = serde_json::from_value(json!({"id": 5, "price": "19.9", "quantity": 3})).unwrap();
        assert_eq!(item.line_total(), "59.7".parse().unwrap());
    }

    #[test]
    fn line_ids_fall_back() {
        let line = OrderLine { perfume_id: Some(ProductId(9)), id: Some(2), ..Default::default() };
        assert_eq!(line.product_id(), Some(ProductId(9)));
        let line = OrderLine { id: Some(0), ..Default::default() };
        assert_eq!(line.product_id(), None);
        assert_eq!(line.unit_price_or_zero(), Money::ZERO);
    }
}
