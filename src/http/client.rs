use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::error::ApiError;
use super::request::{ApiRequest, ApiResponse};
use super::transport::Transport;

/// A hook around every call made through an [`HttpClient`].
///
/// `on_request` runs before the request is sent. `on_error` runs when the
/// transport (or an earlier interceptor) rejected the call; it may recover by
/// returning a response, typically by re-issuing the request through `client`.
#[async_trait]
pub trait Interceptor: Send + Sync {
    fn on_request(&self, _request: &mut ApiRequest) {}

    async fn on_error(
        &self,
        _client: &HttpClient,
        _request: ApiRequest,
        error: ApiError,
    ) -> Result<ApiResponse, ApiError> {
        Err(error)
    }
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    interceptors: RwLock<Vec<Arc<dyn Interceptor>>>,
}

/// The API client with interceptable request and response phases.
/// Cloning is cheap; clones share transport and interceptors.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        HttpClient {
            inner: Arc::new(ClientInner {
                transport,
                interceptors: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Registers an interceptor. Interceptors run in registration order.
    pub fn use_interceptor(&self, interceptor: Arc<dyn Interceptor>) {
        self.inner
            .interceptors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(interceptor);
    }

    fn interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        self.inner
            .interceptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sends a request through the full chain.
    ///
    /// Boxed because interceptors re-enter the client when they retry.
    pub fn send(&self, mut request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ApiError>> {
        async move {
            let interceptors = self.interceptors();
            for interceptor in &interceptors {
                interceptor.on_request(&mut request);
            }

            let mut error = match self.inner.transport.send(&request).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            for interceptor in &interceptors {
                match interceptor.on_error(self, request.clone(), error).await {
                    Ok(response) => return Ok(response),
                    Err(e) => error = e,
                }
            }

            debug!("{} {} failed: {}", request.method, request.path, error);
            Err(error)
        }
        .boxed()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ApiError> {
        self.send(ApiRequest::post(path, body)).await?.json()
    }
}
