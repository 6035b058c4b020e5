use std::sync::Arc;

use storefront_engine::{
    cart::CartStore,
    session::{SessionAuth, SessionStore, SessionUser},
    test_utils::{MemoryStore, ScriptedTransport, TEST_BASE_URL},
    StorefrontApi,
};

/// One shopper's storage, session and backend, wired like the CLI wires them.
pub struct Storefront {
    pub store: MemoryStore,
    pub transport: ScriptedTransport,
    pub session: SessionStore<MemoryStore>,
    pub cart: CartStore<MemoryStore>,
    pub api: StorefrontApi<ScriptedTransport>,
}

pub fn storefront() -> Storefront {
    let _ = env_logger::try_init();
    let store = MemoryStore::default();
    let transport = ScriptedTransport::new();
    let session = SessionStore::new(store.clone());
    let auth = SessionAuth::new(session.clone());
    let api = StorefrontApi::new(TEST_BASE_URL, transport.clone(), Arc::new(auth));
    Storefront { cart: CartStore::new(store.clone()), store, transport, session, api }
}

pub fn sign_in(shop: &Storefront, user: SessionUser) {
    shop.session.set_user(&user);
    shop.session.set_auth_token(Some("integration-token"));
}
