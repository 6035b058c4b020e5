use log::*;
use serde::{de::DeserializeOwned, Serialize};

/// String-keyed durable storage. Writes are best-effort: a backend that cannot persist a value logs the problem
/// and carries on.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Reads and deserializes the JSON value stored under `key`. Missing or corrupt entries yield `fallback`.
pub fn get_json<S, T>(store: &S, key: &str, fallback: T) -> T
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get_item(key) else {
        return fallback;
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("🪛️ Stored value for '{key}' is corrupt and will be ignored. {e}");
            fallback
        },
    }
}

/// Stores `value` as JSON under `key`. `None` removes the key.
pub fn set_json<S, T>(store: &S, key: &str, value: Option<&T>)
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    match value.map(serde_json::to_string) {
        Some(Ok(json)) => store.set_item(key, &json),
        Some(Err(e)) => error!("🪛️ Could not serialize value for '{key}'. {e}"),
        None => store.remove_item(key),
    }
}
