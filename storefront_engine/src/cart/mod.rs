mod cart_store;

pub use cart_store::{CartStore, CART_KEY};
