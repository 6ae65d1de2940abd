use http::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::error::ApiError;

/// One outgoing call, as seen by the interceptors.
///
/// A request is created fresh for every call and carries its own `retried`
/// flag, so a single call is refreshed-and-retried at most once.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. "/employees".
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Set once the auth interceptor has re-issued this request.
    pub retried: bool,
    /// When false, a 403 is handed back to the caller untouched: no renewal, no forced logout.
    pub recover_auth: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
            retried: false,
            recover_auth: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        let mut request = Self::new(Method::POST, path);
        request.body = Some(body);
        request
    }

    /// Marks credential-exchange calls whose 403 means "rejected", not "expired".
    pub fn without_auth_recovery(mut self) -> Self {
        self.recover_auth = false;
        self
    }

    /// Sets `Authorization: Bearer <token>`, replacing any previous value.
    pub fn set_bearer(&mut self, token: &str) {
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                self.headers.insert(AUTHORIZATION, value);
            }
            Err(e) => warn!("Access token is not a valid header value: {}", e),
        }
    }

    /// The bearer token currently attached, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}

/// A successful answer. Non-success statuses surface as `ApiError::Status` instead.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        ApiResponse { status, body }
    }

    /// Deserializes the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }
}
