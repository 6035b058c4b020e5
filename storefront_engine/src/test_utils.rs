//! In-memory collaborators for tests.
//!
//! [`MemoryStore`] stands in for the persisted key-value store and [`ScriptedTransport`] for the backend. The
//! transport is also a spy: every request it receives is recorded, so tests can assert that a code path made no
//! network call at all.
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use log::*;
use serde_json::Value;

use crate::{
    errors::TransportError,
    traits::{AuthProvider, HttpMethod, HttpRequest, HttpResponse, HttpTransport, KeyValueStore},
};

pub const TEST_BASE_URL: &str = "http://storefront.test/api";

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

//--------------------------------------     MemoryStore     ---------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn keys(&self) -> Vec<String> {
        let mut keys = lock(&self.values).keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        lock(&self.values).insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        lock(&self.values).remove(key);
    }
}

/// Always presents the same bearer token.
#[derive(Debug, Clone)]
pub struct StaticAuth(pub String);

impl AuthProvider for StaticAuth {
    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![("Authorization".to_string(), format!("Bearer {}", self.0))]
    }
}

//--------------------------------------  ScriptedTransport  ---------------------------------------------------------
#[derive(Debug, Clone)]
pub enum Scripted {
    Respond(HttpResponse),
    /// Respond after the given (tokio) delay.
    Delayed(Duration, HttpResponse),
    Fail(String),
}

pub fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        reason: None,
        content_type: Some("application/json".to_string()),
        body: body.to_string(),
    }
}

pub fn text_response(status: u16, body: &str) -> HttpResponse {
    HttpResponse { status, reason: None, content_type: Some("text/plain".to_string()), body: body.to_string() }
}

pub fn no_content() -> HttpResponse {
    HttpResponse { status: 204, reason: Some("No Content".to_string()), content_type: None, body: String::new() }
}

#[derive(Debug, Default)]
struct Script {
    routes: HashMap<(HttpMethod, String), VecDeque<Scripted>>,
    requests: Vec<HttpRequest>,
}

/// A backend that replays canned responses, keyed by method and path.
///
/// Responses queued for the same route are served in order; the last one is repeated once the queue is down to a
/// single entry. Requests to unknown routes fail with a network error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: HttpMethod, path: &str, reply: Scripted) -> &Self {
        let mut script = lock(&self.script);
        script.routes.entry((method, path.to_string())).or_default().push_back(reply);
        self
    }

    pub fn respond(&self, method: HttpMethod, path: &str, response: HttpResponse) -> &Self {
        self.on(method, path, Scripted::Respond(response))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.script).requests.clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.script).requests.len()
    }

    pub fn requests_to(&self, method: HttpMethod, path: &str) -> usize {
        let url = format!("{TEST_BASE_URL}{path}");
        lock(&self.script).requests.iter().filter(|r| r.method == method && r.url == url).count()
    }

    fn next_reply(&self, request: &HttpRequest) -> Option<Scripted> {
        let mut script = lock(&self.script);
        script.requests.push(request.clone());
        let path = request.url.strip_prefix(TEST_BASE_URL).unwrap_or(&request.url).to_string();
        let queue = script.routes.get_mut(&(request.method, path))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!("🌐️ Scripted {} {}", request.method, request.url);
        match self.next_reply(&request) {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            },
            Some(Scripted::Fail(message)) => Err(TransportError::Network(message)),
            None => Err(TransportError::Network(format!("No scripted response for {} {}", request.method, request.url))),
        }
    }
}
