use log::*;
use shop_common::Money;

use crate::{
    store_types::{CartItem, ProductId},
    traits::{get_json, set_json, KeyValueStore},
};

pub const CART_KEY: &str = "cart";

/// The shopper's cart, persisted as a JSON list under [`CART_KEY`].
///
/// Every mutation persists the new cart before returning it, so the stored copy and the caller's copy never
/// diverge.
#[derive(Debug, Clone)]
pub struct CartStore<S> {
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The persisted cart. A missing or corrupt entry is an empty cart.
    pub fn load(&self) -> Vec<CartItem> {
        get_json(&self.store, CART_KEY, Vec::new())
    }

    pub fn save(&self, items: &[CartItem]) {
        set_json(&self.store, CART_KEY, Some(items));
    }

    /// Adds one unit of `item`. A product already in the cart has its quantity bumped instead.
    pub fn add_item(&self, mut items: Vec<CartItem>, item: CartItem) -> Vec<CartItem> {
        match items.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
            None => {
                debug!("🛒️ Adding product {} to the cart", item.id);
                items.push(CartItem { quantity: 1, ..item });
            },
        }
        self.save(&items);
        items
    }

    /// Changes the quantity of product `id` by `delta`. Quantities never drop below 1; use
    /// [`remove_item`](Self::remove_item) to take a product out.
    pub fn update_quantity(&self, mut items: Vec<CartItem>, id: ProductId, delta: i64) -> Vec<CartItem> {
        if let Some(item) = items.iter_mut().find(|i| i.id == id) {
            let new_qty = i64::from(item.quantity).saturating_add(delta).clamp(1, i64::from(u32::MAX));
            item.quantity = u32::try_from(new_qty).unwrap_or(u32::MAX);
        } else {
            debug!("🛒️ Product {id} is not in the cart. Nothing to update");
        }
        self.save(&items);
        items
    }

    pub fn remove_item(&self, mut items: Vec<CartItem>, id: ProductId) -> Vec<CartItem> {
        items.retain(|i| i.id != id);
        self.save(&items);
        items
    }

    /// Empties the cart and removes its storage entry.
    pub fn clear(&self) {
        debug!("🛒️ Clearing the cart");
        set_json::<_, Vec<CartItem>>(&self.store, CART_KEY, None);
    }

    pub fn total(items: &[CartItem]) -> Money {
        items.iter().map(CartItem::line_total).sum()
    }
}
