use log::*;

use crate::{
    api::StorefrontApi,
    cart::CartStore,
    errors::ApiError,
    orders::{build_payload, OrderPayload},
    store_types::{CartItem, Order, UserId},
    traits::{HttpTransport, KeyValueStore},
};

/// The cart → order handoff. A successful submission always empties the persisted cart.
#[derive(Debug, Clone)]
pub struct OrderSubmissionService<T, S> {
    api: StorefrontApi<T>,
    cart: CartStore<S>,
}

impl<T, S> OrderSubmissionService<T, S>
where
    T: HttpTransport,
    S: KeyValueStore,
{
    pub fn new(api: StorefrontApi<T>, cart: CartStore<S>) -> Self {
        Self { api, cart }
    }

    pub fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    /// Validates the cart, builds the payload and submits it. Validation failures never reach the network.
    pub async fn place_order(&self, user_id: Option<UserId>, items: &[CartItem]) -> Result<Option<Order>, ApiError> {
        let payload = build_payload(user_id, items)?;
        self.submit(&payload).await
    }

    /// Submits a prepared payload. Returns the server's confirmation when it sent a readable one.
    pub async fn submit(&self, payload: &OrderPayload) -> Result<Option<Order>, ApiError> {
        debug!("📦️ Submitting an order of {} lines for user {}", payload.items().len(), payload.user_id());
        let confirmation = self.api.create_order(payload).await.map_err(|e| {
            error!("📦️ Order submission failed. {e}");
            e
        })?;
        self.cart.clear();
        match &confirmation {
            Some(order) => info!("📦️ Order {} accepted", order.id),
            None => info!("📦️ Order accepted without a confirmation body"),
        }
        Ok(confirmation)
    }
}
