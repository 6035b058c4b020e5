use std::{env, path::PathBuf, time::Duration};

use log::*;
use shop_common::{
    helpers::{non_empty, parse_boolean_flag},
    Secret,
};
use url::Url;

use crate::ClientError;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/starter/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DATA_DIR_NAME: &str = ".shoptools";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// The REST base URL. Endpoint paths are appended to it.
    pub api_url: String,
    /// Where the cart and session are persisted.
    pub data_dir: PathBuf,
    pub timeout: Duration,
    /// A bearer token that overrides the stored session's token.
    pub auth_token: Option<Secret<String>>,
    /// Skip TLS certificate validation. Only for local test backends.
    pub accept_invalid_certs: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: default_data_dir(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth_token: None,
            accept_invalid_certs: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(DATA_DIR_NAME)
}

impl ClientConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which maps a variable name to its value. Invalid values are reported
    /// and replaced by their defaults.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let defaults = Self::default();
        let api_url = lookup("STOREFRONT_API_URL")
            .filter(|s| !s.trim().is_empty())
            .and_then(|s| match validate_url(&s) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("🪛️ {e} Using the default, {DEFAULT_API_URL}, instead.");
                    None
                },
            })
            .unwrap_or(defaults.api_url);
        let data_dir = lookup("STOREFRONT_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let timeout = lookup("STOREFRONT_TIMEOUT_SECS")
            .and_then(|s| match s.trim().parse::<u64>() {
                Ok(0) | Err(_) => {
                    warn!(
                        "🪛️ {s} is not a valid value for STOREFRONT_TIMEOUT_SECS. Using the default, \
                         {DEFAULT_TIMEOUT_SECS}s, instead."
                    );
                    None
                },
                Ok(secs) => Some(Duration::from_secs(secs)),
            })
            .unwrap_or(defaults.timeout);
        let auth_token = non_empty(lookup("STOREFRONT_AUTH_TOKEN").as_deref()).map(|s| Secret::new(s.to_string()));
        let accept_invalid_certs = parse_boolean_flag(lookup("STOREFRONT_ACCEPT_INVALID_CERTS"), false);
        if accept_invalid_certs {
            warn!("🪛️ TLS certificate validation is disabled.");
        }
        Self { api_url, data_dir, timeout, auth_token, accept_invalid_certs }
    }
}

/// Checks that `raw` is an absolute http(s) URL and returns it without a trailing slash.
pub fn validate_url(raw: &str) -> Result<String, ClientError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ClientError::InvalidUrl { url: raw.to_string(), reason: e.to_string() })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl { url: raw.to_string(), reason: "only http and https are supported".into() });
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> ClientConfig {
        let vars = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<HashMap<_, _>>();
        ClientConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert_eq!(c.timeout, Duration::from_secs(30));
        assert!(c.auth_token.is_none());
        assert!(c.data_dir.ends_with(".shoptools"));
        assert!(!c.accept_invalid_certs);
    }

    #[test]
    fn overrides() {
        let c = config(&[
            ("STOREFRONT_API_URL", "https://shop.example.com/api/"),
            ("STOREFRONT_DATA_DIR", "/tmp/shop"),
            ("STOREFRONT_TIMEOUT_SECS", "5"),
            ("STOREFRONT_AUTH_TOKEN", "tok"),
            ("STOREFRONT_ACCEPT_INVALID_CERTS", "yes"),
        ]);
        assert_eq!(c.api_url, "https://shop.example.com/api");
        assert_eq!(c.data_dir, PathBuf::from("/tmp/shop"));
        assert_eq!(c.timeout, Duration::from_secs(5));
        assert_eq!(c.auth_token.as_ref().map(|t| t.reveal().as_str()), Some("tok"));
        assert!(c.accept_invalid_certs);
    }

    #[test]
    fn invalid_values_fall_back() {
        let c = config(&[
            ("STOREFRONT_API_URL", "ftp://files.example.com"),
            ("STOREFRONT_TIMEOUT_SECS", "0"),
            ("STOREFRONT_AUTH_TOKEN", "  "),
        ]);
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert_eq!(c.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(c.auth_token.is_none());
        let c = config(&[("STOREFRONT_API_URL", "not a url"), ("STOREFRONT_TIMEOUT_SECS", "soon")]);
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert_eq!(c.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
