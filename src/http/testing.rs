//! In-process transport for unit tests that need to control timing or count calls.

use std::future::Future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use http::StatusCode;
use serde_json::Value;

use super::error::ApiError;
use super::request::{ApiRequest, ApiResponse};
use super::transport::Transport;

type Handler = dyn Fn(ApiRequest) -> BoxFuture<'static, Result<ApiResponse, ApiError>> + Send + Sync;

pub(crate) struct ScriptedTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new<F, Fut>(handler: F) -> Arc<Self>
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ApiResponse, ApiError>> + Send + 'static,
    {
        Arc::new(ScriptedTransport {
            handler: Box::new(move |request| handler(request).boxed()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answers every call with 200 and `body`.
    pub(crate) fn ok(body: Value) -> Arc<Self> {
        Self::new(move |_| {
            let body = body.clone();
            async move { Ok(ApiResponse::new(StatusCode::OK, body)) }
        })
    }

    /// Rejects every call with `status`.
    pub(crate) fn status(status: StatusCode) -> Arc<Self> {
        Self::new(move |_| async move { Err(ApiError::from_status(status, "scripted")) })
    }

    /// Every request that reached the wire, in order.
    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.calls.lock().unwrap().push(request.clone());
        (self.handler)(request.clone()).await
    }
}

pub(crate) fn forbidden() -> ApiError {
    ApiError::from_status(StatusCode::FORBIDDEN, "Forbidden")
}
