//! REST client for the storefront backend.
//!
//! [`StorefrontApi`] maps every endpoint the engine consumes onto domain types. It is the only place that looks at
//! raw responses: non-2xx statuses become [`TransportError`]s carrying the server's text, `204` and non-JSON bodies
//! count as "no body", and list endpoints that return something other than an array degrade to an empty list.
//!
//! Paths are relative to the configured base URL:
//!
//! | Operation                         | Endpoint                       |
//! |-----------------------------------|--------------------------------|
//! | [`StorefrontApi::fetch_all_orders`] | `GET /orders`                |
//! | [`StorefrontApi::create_order`]     | `POST /orders`               |
//! | [`StorefrontApi::update_order_status`] | `PUT /orders/{id}`        |
//! | [`StorefrontApi::fetch_high_value_ids`] | `GET /orders/high-value` |
//! | [`StorefrontApi::fetch_aggregates`] | `GET /orders/aggregates`     |
//! | [`StorefrontApi::fetch_notifications`] | `GET /notifications/orders` |
//! | [`StorefrontApi::clear_notifications`] | `DELETE /notifications/orders` |
//! | [`StorefrontApi::fetch_dead_letters`] | `GET /deadletters`         |
//! | [`StorefrontApi::clear_dead_letters`] | `POST /deadletters/clear`  |
use std::{fmt::Debug, sync::Arc};

use log::*;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    errors::{ApiError, ParseError, TransportError, ValidationError},
    helpers::serde_helpers::list_from_value,
    orders::{HighValueIds, OrderPayload},
    store_types::{AggregateRecord, DeadLetterItem, NotificationItem, Order, OrderId, OrderStatus},
    traits::{AuthProvider, HttpMethod, HttpRequest, HttpResponse, HttpTransport},
};

pub const ORDERS_PATH: &str = "/orders";
pub const HIGH_VALUE_PATH: &str = "/orders/high-value";
pub const AGGREGATES_PATH: &str = "/orders/aggregates";
pub const NOTIFICATIONS_PATH: &str = "/notifications/orders";
pub const DEAD_LETTERS_PATH: &str = "/deadletters";
pub const CLEAR_DEAD_LETTERS_PATH: &str = "/deadletters/clear";

#[derive(Clone)]
pub struct StorefrontApi<T> {
    base_url: String,
    transport: T,
    auth: Arc<dyn AuthProvider>,
}

impl<T> Debug for StorefrontApi<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontApi").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

impl<T: HttpTransport> StorefrontApi<T> {
    pub fn new<S: Into<String>>(base_url: S, transport: T, auth: Arc<dyn AuthProvider>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, transport, auth }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Sends a request with the current auth headers and returns the successful response.
    async fn send(&self, method: HttpMethod, path: &str, body: Option<Value>) -> Result<HttpResponse, TransportError> {
        let mut request = HttpRequest::new(method, self.url(path))
            .with_headers([("Accept".to_string(), "application/json".to_string())])
            .with_headers(self.auth.auth_headers());
        if let Some(body) = body {
            request = request.with_json_body(body.to_string());
        }
        trace!("🌐️ {method} {}", request.url);
        let response = self.transport.send(request).await?;
        if response.is_success() {
            trace!("🌐️ {method} {path} -> {}", response.status);
            Ok(response)
        } else {
            debug!("🌐️ {method} {path} failed with status {}", response.status);
            let body = Some(response.body).filter(|b| !b.trim().is_empty());
            Err(TransportError::from_status(response.status, response.reason.as_deref(), body))
        }
    }

    /// The JSON body of a successful response, or `None` when there is no JSON body to read.
    async fn request(&self, method: HttpMethod, path: &str, body: Option<Value>) -> Result<Option<Value>, ApiError> {
        let response = self.send(method, path, body).await?;
        if !response.has_json_body() {
            return Ok(None);
        }
        let value = serde_json::from_str(&response.body).map_err(ParseError::from)?;
        Ok(Some(value))
    }

    /// Fetches a list endpoint. A missing or non-array body is an empty list.
    async fn fetch_list<I: DeserializeOwned>(&self, path: &str) -> Result<Vec<I>, ApiError> {
        match self.request(HttpMethod::Get, path, None).await? {
            Some(Value::Array(entries)) => Ok(list_from_value(Value::Array(entries))),
            Some(other) => {
                warn!("🌐️ Expected a list from {path}, but got {}. Treating it as empty.", json_kind(&other));
                Ok(Vec::new())
            },
            None => Ok(Vec::new()),
        }
    }

    //------------------------------------------   Orders   ---------------------------------------------------------
    pub async fn fetch_all_orders(&self) -> Result<Vec<Order>, ApiError> {
        let orders = self.fetch_list(ORDERS_PATH).await?;
        debug!("📦️ Fetched {} orders", orders.len());
        Ok(orders)
    }

    /// The ids the backend currently flags as high-value. Entries may be bare numbers or objects carrying `orderId`
    /// or `id`; entries without a usable id are dropped.
    pub async fn fetch_high_value_ids(&self) -> Result<HighValueIds, ApiError> {
        let value = self.request(HttpMethod::Get, HIGH_VALUE_PATH, None).await?;
        let ids = value.map(|v| HighValueIds::from_feed(&v)).unwrap_or_default();
        debug!("📦️ Backend reports {} high-value orders", ids.len());
        Ok(ids)
    }

    /// Fetches the order list and the high-value ids as one refresh. Either failure fails the whole refresh, so the
    /// caller never pairs a fresh list with stale flags.
    pub async fn fetch_orders_with_high_value(&self) -> Result<(Vec<Order>, HighValueIds), ApiError> {
        tokio::try_join!(self.fetch_all_orders(), self.fetch_high_value_ids())
    }

    /// The orders visible to the signed-in user. Fails without sending anything when there are no credentials.
    pub async fn fetch_user_orders(&self) -> Result<Vec<Order>, ApiError> {
        if !self.auth.is_authenticated() {
            return Err(ValidationError::NotAuthenticated.into());
        }
        self.fetch_list(ORDERS_PATH).await
    }

    /// Posts a new order. A refusal is reported as [`ApiError::Submission`]. The confirmation body is optional: an
    /// empty or unreadable body yields `Ok(None)`.
    pub async fn create_order(&self, payload: &OrderPayload) -> Result<Option<Order>, ApiError> {
        let body = serde_json::to_value(payload).map_err(ParseError::from)?;
        let response = self.send(HttpMethod::Post, ORDERS_PATH, Some(body)).await.map_err(|e| match e {
            e @ TransportError::Status { .. } => ApiError::Submission(e),
            e => ApiError::Transport(e),
        })?;
        if !response.has_json_body() {
            return Ok(None);
        }
        let order = serde_json::from_str::<Order>(&response.body)
            .map_err(|e| debug!("📦️ Ignoring unreadable order confirmation. {e}"))
            .ok();
        Ok(order)
    }

    /// `PUT /orders/{id}` with `{status}`. Missing arguments fail before any request is sent. The server's echo of
    /// the order is required, since it is the authoritative post-update state.
    pub async fn update_order_status(
        &self,
        id: Option<OrderId>,
        status: Option<&OrderStatus>,
    ) -> Result<Order, ApiError> {
        let id = id.ok_or(ValidationError::MissingOrderId)?;
        let status = status.filter(|s| !s.as_str().trim().is_empty()).ok_or(ValidationError::MissingStatus)?;
        let path = format!("{ORDERS_PATH}/{}", id.value());
        let value = self.request(HttpMethod::Put, &path, Some(json!({ "status": status }))).await?;
        let value = value.ok_or_else(|| ParseError(format!("The backend did not return order {id}")))?;
        let order = serde_json::from_value::<Order>(value).map_err(ParseError::from)?;
        info!("📦️ Order {id} is now {}", order.status_or_default());
        Ok(order)
    }

    pub async fn fetch_aggregates(&self) -> Result<Vec<AggregateRecord>, ApiError> {
        self.fetch_list(AGGREGATES_PATH).await
    }

    //------------------------------------------   Feeds    ---------------------------------------------------------
    pub async fn fetch_notifications(&self) -> Result<Vec<NotificationItem>, ApiError> {
        self.fetch_list(NOTIFICATIONS_PATH).await
    }

    pub async fn clear_notifications(&self) -> Result<(), ApiError> {
        self.send(HttpMethod::Delete, NOTIFICATIONS_PATH, None).await?;
        info!("🔔️ Order notifications cleared");
        Ok(())
    }

    pub async fn fetch_dead_letters(&self) -> Result<Vec<DeadLetterItem>, ApiError> {
        self.fetch_list(DEAD_LETTERS_PATH).await
    }

    pub async fn clear_dead_letters(&self) -> Result<(), ApiError> {
        self.send(HttpMethod::Post, CLEAR_DEAD_LETTERS_PATH, None).await?;
        info!("🔔️ Dead letters cleared");
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
