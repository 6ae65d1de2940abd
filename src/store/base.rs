use async_trait::async_trait;

use crate::http::{ApiError, HttpClient};

/// Obtains a fresh access token and stores it in the session.
///
/// Failures are returned, never swallowed: the interceptor chain relies on them
/// to decide between retrying and forcing a logout.
#[async_trait]
pub trait TokenRenewer: Send + Sync {
    async fn renew(&self, client: &HttpClient) -> Result<String, ApiError>;
}

/// Ends the current session: reset state, tell sibling contexts, go to the login page.
pub trait LogoutHandler: Send + Sync {
    fn logout(&self);
}
