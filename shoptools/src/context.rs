use std::sync::Arc;

use anyhow::{Context, Result};
use log::*;
use shop_common::Secret;
use storefront_client::{ClientConfig, FileStore, ReqwestTransport};
use storefront_engine::{
    session::{SessionAuth, SessionStore},
    traits::AuthProvider,
    CartStore,
    OrderSubmissionService,
    StorefrontApi,
};

pub type Api = StorefrontApi<ReqwestTransport>;

/// The session token, unless `STOREFRONT_AUTH_TOKEN` overrides it.
struct CliAuth {
    session: SessionAuth<FileStore>,
    token: Option<Secret<String>>,
}

impl AuthProvider for CliAuth {
    fn auth_headers(&self) -> Vec<(String, String)> {
        match &self.token {
            Some(token) => vec![("Authorization".to_string(), format!("Bearer {}", token.reveal()))],
            None => self.session.auth_headers(),
        }
    }

    fn is_authenticated(&self) -> bool {
        self.token.is_some() || self.session.is_authenticated()
    }
}

/// Everything a command needs, wired from the client configuration.
pub struct Shop {
    pub session: SessionStore<FileStore>,
    pub cart: CartStore<FileStore>,
    pub api: Api,
}

impl Shop {
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let store = FileStore::open(&config.data_dir).context("Cannot use the data directory")?;
        let transport = ReqwestTransport::new(&config)?;
        let session = SessionStore::new(store.clone());
        let auth = CliAuth { session: SessionAuth::new(session.clone()), token: config.auth_token.clone() };
        let api = StorefrontApi::new(config.api_url.as_str(), transport, Arc::new(auth));
        info!("🪛️ Talking to {}", api.base_url());
        Ok(Self { session, cart: CartStore::new(store), api })
    }

    pub fn submission_service(&self) -> OrderSubmissionService<ReqwestTransport, FileStore> {
        OrderSubmissionService::new(self.api.clone(), self.cart.clone())
    }
}
