use std::{fmt::Display, future::Future};

use crate::errors::TransportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: None }
    }

    pub fn with_headers<I: IntoIterator<Item = (String, String)>>(mut self, headers: I) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Attaches a JSON body and the matching content type.
    pub fn with_json_body(mut self, body: String) -> Self {
        self.headers.push(("Content-Type".to_string(), "application/json".to_string()));
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    /// The canonical reason phrase for `status`, when the transport knows it.
    pub reason: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// True when the response carries a JSON document worth parsing. `204 No Content`, empty bodies and non-JSON
    /// content types all count as "no body".
    pub fn has_json_body(&self) -> bool {
        if self.status == 204 || self.body.trim().is_empty() {
            return false;
        }
        self.content_type.as_deref().map(|ct| ct.to_ascii_lowercase().contains("application/json")).unwrap_or(false)
    }
}

/// A single request/response exchange with the backend.
///
/// Implementations report connection-level failures as [`TransportError::Network`]. Non-2xx responses are *not*
/// errors at this layer; they are returned as-is and classified by the API client.
pub trait HttpTransport: Clone + Send + Sync + 'static {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

#[cfg(test)]
mod test {
    use super::*;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
        HttpResponse { status, reason: None, content_type: content_type.map(String::from), body: body.to_string() }
    }

    #[test]
    fn json_body_detection() {
        assert!(response(200, Some("application/json; charset=utf-8"), "[]").has_json_body());
        assert!(!response(204, Some("application/json"), "[]").has_json_body());
        assert!(!response(200, Some("text/plain"), "ok").has_json_body());
        assert!(!response(200, None, "[]").has_json_body());
        assert!(!response(200, Some("application/json"), "  ").has_json_body());
    }

    #[test]
    fn methods_key_routes() {
        let routes = [(HttpMethod::Get, "/orders"), (HttpMethod::Post, "/orders"), (HttpMethod::Get, "/orders")]
            .into_iter()
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(routes.len(), 2);
        assert!(routes.contains(&(HttpMethod::Post, "/orders")));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = HttpRequest::new(HttpMethod::Post, "http://x/orders").with_json_body("{}".into());
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.method.to_string(), "POST");
    }
}
