use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{info, warn};

use super::refresh_gate::{RefreshGate, RefreshPhase};
use crate::http::{ApiError, ApiRequest, ApiResponse, HttpClient, Interceptor};
use crate::state::SessionState;
use crate::store::{LogoutHandler, TokenRenewer};
use crate::utils::log_throttle::LogThrottle;

const FORCED_LOGOUT_LOG_WINDOW: Duration = Duration::from_secs(30);

/// Attaches the bearer token to every request and turns a 403 into one
/// renewal-and-retry.
///
/// Only the first 403 of a burst renews the token. A 403 that arrives while a
/// renewal is in flight, a 403 on a request that was already retried, and any
/// other failure end the session instead. Such requests are not queued behind
/// the running renewal.
pub struct AuthInterceptor {
    session: SessionState,
    renewer: Arc<dyn TokenRenewer>,
    logout: Arc<dyn LogoutHandler>,
    gate: RefreshGate,
    renewal_timeout: Option<Duration>,
    forced_logout_log: LogThrottle,
}

impl AuthInterceptor {
    pub fn new(
        session: SessionState,
        renewer: Arc<dyn TokenRenewer>,
        logout: Arc<dyn LogoutHandler>,
    ) -> Self {
        AuthInterceptor {
            session,
            renewer,
            logout,
            gate: RefreshGate::new(),
            renewal_timeout: None,
            forced_logout_log: LogThrottle::new(FORCED_LOGOUT_LOG_WINDOW),
        }
    }

    /// Bounds each renewal; a renewal that does not settle in time counts as failed.
    pub fn with_renewal_timeout(mut self, renewal_timeout: Option<Duration>) -> Self {
        self.renewal_timeout = renewal_timeout;
        self
    }

    pub fn refresh_phase(&self) -> RefreshPhase {
        self.gate.phase()
    }

    async fn renew(&self, client: &HttpClient) -> Result<String, ApiError> {
        match self.renewal_timeout {
            Some(limit) => timeout(limit, self.renewer.renew(client))
                .await
                .map_err(|_| ApiError::Timeout(format!("token renewal after {:?}", limit)))?,
            None => self.renewer.renew(client).await,
        }
    }

    fn force_logout(&self, request: &ApiRequest, error: &ApiError) {
        if let Some(suppressed_count) = self.forced_logout_log.should_emit("interceptor.forced_logout")
        {
            warn!(
                event_name = "interceptor.forced_logout",
                event_domain = "interceptor",
                method = %request.method,
                path = request.path.as_str(),
                retried = request.retried,
                refresh_phase = ?self.gate.phase(),
                suppressed_count,
                "request failed without recovery, ending session: {}",
                error
            );
        }
        self.logout.logout();
    }
}

#[async_trait]
impl Interceptor for AuthInterceptor {
    fn on_request(&self, request: &mut ApiRequest) {
        if let Some(token) = self.session.access_token() {
            request.set_bearer(&token);
        }
    }

    async fn on_error(
        &self,
        client: &HttpClient,
        mut request: ApiRequest,
        error: ApiError,
    ) -> Result<ApiResponse, ApiError> {
        if !request.recover_auth {
            return Err(error);
        }

        if error.is_forbidden() && !request.retried {
            if let Some(permit) = self.gate.try_begin() {
                request.retried = true;
                info!(
                    event_name = "interceptor.refresh.started",
                    event_domain = "interceptor",
                    method = %request.method,
                    path = request.path.as_str(),
                    "access token rejected, renewing"
                );

                let renewal = {
                    let _permit = permit;
                    self.renew(client).await
                };

                return match renewal {
                    Ok(_) => {
                        if let Some(token) = self.session.access_token() {
                            request.set_bearer(&token);
                        }
                        info!(
                            event_name = "interceptor.refresh.succeeded",
                            event_domain = "interceptor",
                            path = request.path.as_str(),
                            "access token renewed, retrying request"
                        );
                        client.send(request).await
                    }
                    // Already logged out by whoever ended the session.
                    Err(renewal_error @ ApiError::SessionEnded(_)) => {
                        info!(
                            event_name = "interceptor.refresh.discarded",
                            event_domain = "interceptor",
                            path = request.path.as_str(),
                            "session ended during renewal, not retrying"
                        );
                        Err(renewal_error)
                    }
                    Err(renewal_error) => {
                        warn!(
                            event_name = "interceptor.refresh.failed",
                            event_domain = "interceptor",
                            path = request.path.as_str(),
                            "token renewal failed: {}",
                            renewal_error
                        );
                        self.logout.logout();
                        Err(renewal_error)
                    }
                };
            }
        }

        self.force_logout(&request, &error);
        Err(error)
    }
}
