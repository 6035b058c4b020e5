use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
    Method,
};
use storefront_engine::{
    errors::TransportError,
    traits::{HttpMethod, HttpRequest, HttpResponse, HttpTransport},
};

use crate::{ClientConfig, ClientError};

/// [`HttpTransport`] over a shared `reqwest` client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Arc<Client>,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent(concat!("shoptools/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| ClientError::Initialization(e.to_string()))?;
        Ok(Self { client: Arc::new(client) })
    }
}

fn method(m: HttpMethod) -> Method {
    match m {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest { method: m, url, headers, body } = request;
        let mut req = self.client.request(method(m), &url);
        for (name, value) in headers {
            req = req.header(name, value);
        }
        if let Some(body) = body {
            req = req.body(body);
        }
        let response = req.send().await.map_err(|e| {
            debug!("🌐️ {m} {url} could not be sent. {e}");
            TransportError::Network(e.to_string())
        })?;
        let status = response.status();
        let content_type = response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(String::from);
        let body = response.text().await.map_err(|e| TransportError::Network(e.to_string()))?;
        trace!("🌐️ {m} {url} -> {status}, {} bytes", body.len());
        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(String::from),
            content_type,
            body,
        })
    }
}
