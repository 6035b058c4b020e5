/// Supplies the headers that authenticate a request against the backend.
pub trait AuthProvider: Send + Sync {
    /// Headers to attach to the next request. Empty when there are no credentials.
    fn auth_headers(&self) -> Vec<(String, String)>;

    fn is_authenticated(&self) -> bool {
        !self.auth_headers().is_empty()
    }
}

/// Anonymous access.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl AuthProvider for NoAuth {
    fn auth_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}
