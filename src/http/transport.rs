use std::time::Duration;

use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use super::error::ApiError;
use super::request::{ApiRequest, ApiResponse};
use crate::config::ApiConfig;

/// Sends one request over the wire. Interceptors run around it, not inside it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed transport: JSON in and out, cookies kept between calls so the
/// refresh cookie issued by `/auth` travels with `/refresh`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        // Ensure base_url ends without a trailing slash
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::Configuration("api.base_url is required".into()));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .cookie_store(true)
            .default_headers(default_headers)
            .user_agent(
                config
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| format!("sessiontron/{}", env!("CARGO_PKG_VERSION"))),
            );
        if let Some(ms) = config.timeout_in_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("Sending {} request to: {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = if text.is_empty() {
                status.to_string()
            } else {
                text
            };
            return Err(ApiError::from_status(status, message));
        }

        // Some endpoints answer with an empty or plain-text body; keep it instead of failing.
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok(ApiResponse::new(status, body))
    }
}
