//! The persisted session: who is signed in and which credential to present.
//!
//! The backend describes a user's role sometimes as a bare string and sometimes as an object (`{"name": "ADMIN"}`
//! or `{"role": "admin"}`). [`Role::from_value`] is the single place that shape is resolved.
use std::fmt::Display;

use log::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::{
    helpers::serde_helpers::loose_string,
    store_types::UserId,
    traits::{get_json, set_json, AuthProvider, KeyValueStore},
};

pub const USER_KEY: &str = "user";
pub const AUTH_KEY: &str = "auth";
/// Written by older storefront builds. Only ever removed.
pub const LEGACY_TOKEN_KEY: &str = "token";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Role {
    Admin,
    #[default]
    Customer,
    Other(String),
}

impl Role {
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        match name.to_ascii_lowercase().as_str() {
            "admin" | "role_admin" => Self::Admin,
            "" | "customer" | "user" | "client" => Self::Customer,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Normalises whatever the backend sent for a role. Missing or unreadable roles are [`Role::Customer`].
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::from_name(s),
            Value::Object(obj) => obj
                .get("name")
                .or_else(|| obj.get("role"))
                .map(Self::from_value)
                .unwrap_or_default(),
            _ => Self::Customer,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Customer => "CUSTOMER",
            Role::Other(s) => s.as_str(),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(Role::from_value).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn user(&self) -> Option<SessionUser> {
        get_json(&self.store, USER_KEY, None)
    }

    pub fn set_user(&self, user: &SessionUser) {
        debug!("🔑️ Storing session for {}", user.email.as_deref().unwrap_or("an anonymous user"));
        set_json(&self.store, USER_KEY, Some(user));
    }

    pub fn auth_token(&self) -> Option<String> {
        self.store.get_item(AUTH_KEY).filter(|t| !t.trim().is_empty())
    }

    /// Stores the credential. `None` (or an empty token) removes it.
    pub fn set_auth_token(&self, token: Option<&str>) {
        match token.filter(|t| !t.trim().is_empty()) {
            Some(t) => self.store.set_item(AUTH_KEY, t),
            None => self.store.remove_item(AUTH_KEY),
        }
    }

    pub fn clear(&self) {
        info!("🔑️ Signing out");
        self.store.remove_item(USER_KEY);
        self.store.remove_item(AUTH_KEY);
        self.store.remove_item(LEGACY_TOKEN_KEY);
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_token().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && self.user().map(|u| u.is_admin()).unwrap_or(false)
    }
}

/// Presents the stored session token as `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct SessionAuth<S> {
    session: SessionStore<S>,
}

impl<S: KeyValueStore> SessionAuth<S> {
    pub fn new(session: SessionStore<S>) -> Self {
        Self { session }
    }
}

impl<S: KeyValueStore> AuthProvider for SessionAuth<S> {
    fn auth_headers(&self) -> Vec<(String, String)> {
        self.session
            .auth_token()
            .map(|token| vec![("Authorization".to_string(), format!("Bearer {}", token.trim()))])
            .unwrap_or_default()
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }
}
