use log::*;
use shop_common::Money;

use crate::{
    api::StorefrontApi,
    errors::{ApiError, ValidationError},
    helpers::matches_query,
    orders::{is_high_value, total_of, HighValueIds, HIGH_VALUE_THRESHOLD},
    store_types::{Order, OrderId, OrderStatus},
    traits::HttpTransport,
};

/// The admin's working view of every order.
///
/// The canonical list and the high-value ids are only ever replaced together, from one refresh. The selected order
/// is a separate copy: status edits go into it and stay there until [`save_status`](Self::save_status) succeeds,
/// at which point the server's echo replaces both the list entry and the selection.
#[derive(Debug)]
pub struct OrderAdminReconciler<T> {
    api: StorefrontApi<T>,
    orders: Vec<Order>,
    high_value_ids: HighValueIds,
    filter: String,
    high_value_only: bool,
    selected: Option<Order>,
    loading: bool,
    error: Option<String>,
}

impl<T: HttpTransport> OrderAdminReconciler<T> {
    pub fn new(api: StorefrontApi<T>) -> Self {
        Self {
            api,
            orders: Vec::new(),
            high_value_ids: HighValueIds::default(),
            filter: String::new(),
            high_value_only: false,
            selected: None,
            loading: false,
            error: None,
        }
    }

    /// Re-fetches the orders and the high-value ids. A failure is recorded in [`error`](Self::error) and leaves the
    /// current view untouched.
    pub async fn refresh(&mut self) {
        self.loading = true;
        self.error = None;
        match self.api.fetch_orders_with_high_value().await {
            Ok((orders, ids)) => self.apply_snapshot(orders, ids),
            Err(e) => {
                warn!("📦️ Could not refresh the order list. {e}");
                self.error = Some(e.to_string());
            },
        }
        self.loading = false;
    }

    /// Replaces the canonical list and the high-value ids, then re-points the selection at the refreshed copy of
    /// the selected order, or clears it if that order is gone.
    ///
    /// A pending status edit on the selection is discarded when the list is refreshed.
    pub fn apply_snapshot(&mut self, orders: Vec<Order>, high_value_ids: HighValueIds) {
        debug!("📦️ Order view now holds {} orders ({} flagged by the backend)", orders.len(), high_value_ids.len());
        self.orders = orders;
        self.high_value_ids = high_value_ids;
        if let Some(id) = self.selected.as_ref().map(|o| o.id) {
            self.selected = self.find(id).cloned();
            if self.selected.is_none() {
                debug!("📦️ Order {id} is no longer listed. Clearing the selection");
            }
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn high_value_ids(&self) -> &HighValueIds {
        &self.high_value_ids
    }

    pub fn find(&self, id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    //----------------------------------------   Filtering   --------------------------------------------------------
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Sets the free-text query, e.g. a customer email handed over from the aggregates view.
    pub fn set_filter<S: Into<String>>(&mut self, query: S) {
        self.filter = query.into();
    }

    pub fn high_value_only(&self) -> bool {
        self.high_value_only
    }

    pub fn set_high_value_only(&mut self, value: bool) {
        self.high_value_only = value;
    }

    pub fn is_high_value(&self, order: &Order) -> bool {
        is_high_value(order, &self.high_value_ids, HIGH_VALUE_THRESHOLD)
    }

    /// High-value orders in the whole list, regardless of the current filters.
    pub fn high_value_count(&self) -> usize {
        self.orders.iter().filter(|o| self.is_high_value(o)).count()
    }

    /// The orders passing the high-value toggle and then the text filter, in list order.
    pub fn visible_orders(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| !self.high_value_only || self.is_high_value(o))
            .filter(|o| matches_order(o, &self.filter))
            .collect()
    }

    //----------------------------------------   Selection   --------------------------------------------------------
    pub fn selected(&self) -> Option<&Order> {
        self.selected.as_ref()
    }

    /// Selects the listed order with `id`. Returns false (and clears the selection) if there is none.
    pub fn select(&mut self, id: OrderId) -> bool {
        self.selected = self.find(id).cloned();
        self.selected.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_is_high_value(&self) -> bool {
        self.selected.as_ref().map(|o| self.is_high_value(o)).unwrap_or(false)
    }

    pub fn selected_total(&self) -> Option<Money> {
        self.selected.as_ref().and_then(total_of)
    }

    /// The status shown in the editor: the pending edit, the order's own status, or `PENDING`.
    pub fn status_of_selected(&self) -> Option<OrderStatus> {
        self.selected.as_ref().map(Order::status_or_default)
    }

    /// Changes the selected order's status locally. Nothing is sent until [`save_status`](Self::save_status).
    pub fn edit_status(&mut self, status: OrderStatus) -> Result<(), ValidationError> {
        let selected = self.selected.as_mut().ok_or(ValidationError::MissingOrderId)?;
        trace!("📦️ Editing order {} status: {status}", selected.id);
        selected.status = Some(status);
        Ok(())
    }

    /// Sends the selected order's status to the backend. On success the returned order replaces both the list entry
    /// and the selection. On failure the local edit is kept so it can be retried.
    pub async fn save_status(&mut self) -> Result<Order, ApiError> {
        let (id, status) = match &self.selected {
            Some(order) => (Some(order.id), order.status_or_default()),
            None => (None, OrderStatus::default()),
        };
        self.loading = true;
        self.error = None;
        let result = self.api.update_order_status(id, Some(&status)).await;
        self.loading = false;
        match result {
            Ok(updated) => {
                if let Some(entry) = self.orders.iter_mut().find(|o| o.id == updated.id) {
                    *entry = updated.clone();
                }
                self.selected = Some(updated.clone());
                Ok(updated)
            },
            Err(e) => {
                error!("📦️ Could not update order status. {e}");
                self.error = Some(e.to_string());
                Err(e)
            },
        }
    }
}

/// Free-text match over the order id, customer email and names, status and computed total.
pub fn matches_order(order: &Order, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let id = order.id.value().to_string();
    let status = order.status.as_ref().map(|s| s.to_string());
    let total = total_of(order).map(|t| t.to_string());
    let fields =
        [Some(id.as_str()), order.customer_email(), status.as_deref(), total.as_deref(), order.first_name(), order.last_name()];
    let matched = fields.into_iter().flatten().any(|f| matches_query(Some(f), query));
    matched
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::{
        api::{HIGH_VALUE_PATH, ORDERS_PATH},
        test_utils::{json_response, text_response, ScriptedTransport, StaticAuth, TEST_BASE_URL},
        traits::HttpMethod,
    };

    fn orders() -> serde_json::Value {
        json!([
            {"id": 1, "status": "PENDING", "total": 40, "user": {"email": "helene@example.com", "firstName": "Hélène", "lastName": "Dupré"}},
            {"id": 2, "status": "PAID", "items": [{"quantity": 3, "unitPrice": 200}], "userEmail": "marc@example.com"},
            {"id": 3, "status": "SHIPPED", "totalPrice": "120.5", "customerEmail": "zoe@example.com"}
        ])
    }

    fn reconciler(transport: &ScriptedTransport) -> OrderAdminReconciler<ScriptedTransport> {
        OrderAdminReconciler::new(StorefrontApi::new(TEST_BASE_URL, transport.clone(), Arc::new(StaticAuth("a".into()))))
    }

    fn loaded() -> (ScriptedTransport, OrderAdminReconciler<ScriptedTransport>) {
        let transport = ScriptedTransport::new();
        transport.respond(HttpMethod::Get, ORDERS_PATH, json_response(200, orders()));
        transport.respond(HttpMethod::Get, HIGH_VALUE_PATH, json_response(200, json!([{"orderId": 3}])));
        let r = reconciler(&transport);
        (transport, r)
    }

    fn visible_ids(r: &OrderAdminReconciler<ScriptedTransport>) -> Vec<i64> {
        r.visible_orders().iter().map(|o| o.id.value()).collect()
    }

    #[tokio::test]
    async fn refresh_loads_orders_and_flags_together() {
        let (transport, mut r) = loaded();
        r.refresh().await;
        assert!(r.error().is_none());
        assert_eq!(r.orders().len(), 3);
        assert_eq!(transport.requests_to(HttpMethod::Get, HIGH_VALUE_PATH), 1);
        // #2 by threshold (600), #3 by the backend
        assert_eq!(r.high_value_count(), 2);
        r.set_high_value_only(true);
        assert_eq!(visible_ids(&r), vec![2, 3]);
    }

    #[tokio::test]
    async fn text_filter() {
        let (_, mut r) = loaded();
        r.refresh().await;
        r.set_filter("helene");
        assert_eq!(visible_ids(&r), vec![1]);
        r.set_filter("DUPRE");
        assert_eq!(visible_ids(&r), vec![1]);
        r.set_filter("600");
        assert_eq!(visible_ids(&r), vec![2]);
        r.set_filter("shipped");
        assert_eq!(visible_ids(&r), vec![3]);
        r.set_filter("example.com");
        r.set_high_value_only(true);
        assert_eq!(visible_ids(&r), vec![2, 3]);
        r.set_filter("");
        r.set_high_value_only(false);
        assert_eq!(visible_ids(&r), vec![1, 2, 3]);
    }

    #[test]
    fn order_fields_match_queries() {
        let order: Order = serde_json::from_value(json!({
            "id": 41, "status": "PAID", "total": "72.5", "user": {"email": "lea@example.com", "lastName": "Bérard"}
        }))
        .unwrap();
        assert!(matches_order(&order, "41"));
        assert!(matches_order(&order, "paid"));
        assert!(matches_order(&order, "72.5"));
        assert!(matches_order(&order, "berard"));
        assert!(matches_order(&order, "  "));
        assert!(!matches_order(&order, "delivered"));
        assert!(!matches_order(&Order::new(OrderId(5)), "lea"));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_the_view() {
        let (transport, mut r) = loaded();
        r.refresh().await;
        transport.respond(HttpMethod::Get, HIGH_VALUE_PATH, text_response(500, "rules engine down"));
        // queue for the high-value route is now [ok, error]; the next refresh consumes the ok one
        r.refresh().await;
        r.refresh().await;
        assert_eq!(r.error(), Some("rules engine down"));
        assert_eq!(r.orders().len(), 3);
        assert!(r.high_value_ids().contains(OrderId(3)));
        assert!(!r.is_loading());
    }

    #[tokio::test]
    async fn selection_follows_refreshes() {
        let (_, mut r) = loaded();
        r.refresh().await;
        assert!(r.select(OrderId(2)));
        assert!(r.selected_is_high_value());
        assert_eq!(r.selected_total(), Some(Money::from(600)));
        let fresh: Vec<Order> = serde_json::from_value(json!([{"id": 2, "status": "DELIVERED"}])).unwrap();
        r.apply_snapshot(fresh, HighValueIds::default());
        assert_eq!(r.selected().and_then(|o| o.status.clone()), Some(OrderStatus::Delivered));
        r.apply_snapshot(Vec::new(), HighValueIds::default());
        assert!(r.selected().is_none());
        assert!(!r.select(OrderId(2)));
    }

    #[tokio::test]
    async fn saving_uses_the_server_echo() {
        let (transport, mut r) = loaded();
        transport.respond(
            HttpMethod::Put,
            "/orders/1",
            json_response(200, json!({"id": 1, "status": "SHIPPED", "total": 40, "shippingAddress": "1 rue X"})),
        );
        r.refresh().await;
        r.select(OrderId(1));
        r.edit_status(OrderStatus::Paid).unwrap();
        assert_eq!(r.find(OrderId(1)).and_then(|o| o.status.clone()), Some(OrderStatus::Pending));
        let updated = r.save_status().await.unwrap();
        assert_eq!(updated.status, Some(OrderStatus::Shipped));
        assert_eq!(r.find(OrderId(1)), Some(&updated));
        assert_eq!(r.selected(), Some(&updated));
        let body = transport.requests().last().and_then(|req| req.body.clone()).unwrap();
        assert_eq!(body, r#"{"status":"PAID"}"#);
    }

    #[tokio::test]
    async fn failed_saves_keep_the_edit() {
        let (transport, mut r) = loaded();
        transport.respond(HttpMethod::Put, "/orders/3", text_response(409, "Order already delivered"));
        r.refresh().await;
        r.select(OrderId(3));
        r.edit_status(OrderStatus::Cancelled).unwrap();
        let err = r.save_status().await.unwrap_err();
        assert_eq!(err.to_string(), "Order already delivered");
        assert_eq!(r.error(), Some("Order already delivered"));
        assert_eq!(r.status_of_selected(), Some(OrderStatus::Cancelled));
        assert_eq!(r.find(OrderId(3)).and_then(|o| o.status.clone()), Some(OrderStatus::Shipped));
    }

    #[tokio::test]
    async fn saving_without_a_selection() {
        let (transport, mut r) = loaded();
        assert_eq!(r.edit_status(OrderStatus::Paid), Err(ValidationError::MissingOrderId));
        let err = r.save_status().await.unwrap_err();
        assert_eq!(err, ApiError::Validation(ValidationError::MissingOrderId));
        assert_eq!(transport.request_count(), 0);
    }
}
