use async_trait::async_trait;
use tracing::debug;

use super::base::TokenRenewer;
use crate::http::{ApiError, ApiRequest, HttpClient};
use crate::models::TokenResponse;
use crate::state::SessionState;

pub const REFRESH_PATH: &str = "/refresh";

/// Renews the access token through `GET /refresh`, relying on the refresh cookie.
pub struct RefreshEndpoint {
    session: SessionState,
}

impl RefreshEndpoint {
    pub fn new(session: SessionState) -> Self {
        RefreshEndpoint { session }
    }
}

#[async_trait]
impl TokenRenewer for RefreshEndpoint {
    async fn renew(&self, client: &HttpClient) -> Result<String, ApiError> {
        debug!("Requesting a new access token from {}", REFRESH_PATH);
        let generation = self.session.generation();

        // A 403 here means the refresh cookie is gone; it must not start another renewal.
        let request = ApiRequest::get(REFRESH_PATH).without_auth_recovery();
        let TokenResponse { access_token } = client.send(request).await?.json()?;

        if access_token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "refresh returned an empty access token".into(),
            ));
        }

        // A logout or a new login while the call was in flight wins over the renewed token.
        if !self.session.update_access_token_for(generation, &access_token) {
            return Err(ApiError::SessionEnded("the token was being renewed".into()));
        }
        Ok(access_token)
    }
}
