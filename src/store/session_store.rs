use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::base::{LogoutHandler, TokenRenewer};
use super::logout::SessionTerminator;
use super::renewer::RefreshEndpoint;
use crate::config::SessionConfig;
use crate::http::{ApiError, ApiRequest, HttpClient, Transport};
use crate::interceptor::AuthInterceptor;
use crate::models::{Credentials, Employee, Session, TokenResponse};
use crate::navigation::{Navigator, DASHBOARD_PATH, LOGIN_PATH};
use crate::signal::SignalPort;
use crate::state::SessionState;

pub const AUTH_PATH: &str = "/auth";
pub const REGISTER_API_PATH: &str = "/register";
pub const EMPLOYEES_PATH: &str = "/employees";

/// The operations the login, register and dashboard pages call.
///
/// The store is the only writer of the session. Failures of `login`,
/// `register` and `refresh_token` are logged and reported as a plain outcome;
/// they never reach the caller as errors.
pub struct SessionStore {
    session: SessionState,
    client: HttpClient,
    renewer: Arc<dyn TokenRenewer>,
    terminator: Arc<dyn LogoutHandler>,
    navigator: Arc<dyn Navigator>,
}

impl SessionStore {
    pub fn new(
        session: SessionState,
        client: HttpClient,
        renewer: Arc<dyn TokenRenewer>,
        terminator: Arc<dyn LogoutHandler>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        SessionStore {
            session,
            client,
            renewer,
            terminator,
            navigator,
        }
    }

    /// Wires a store over `transport`: a client with the auth interceptor
    /// installed, `/refresh` as the renewer and the shared logout path
    /// publishing on `signals`.
    pub fn connect(
        session: SessionState,
        transport: Arc<dyn Transport>,
        signals: SignalPort,
        navigator: Arc<dyn Navigator>,
        session_config: &SessionConfig,
    ) -> Self {
        let renewer: Arc<dyn TokenRenewer> = Arc::new(RefreshEndpoint::new(session.clone()));
        let terminator: Arc<dyn LogoutHandler> = Arc::new(SessionTerminator::new(
            session.clone(),
            signals,
            navigator.clone(),
            session_config.signal_key.clone(),
        ));

        let client = HttpClient::new(transport);
        client.use_interceptor(Arc::new(
            AuthInterceptor::new(session.clone(), renewer.clone(), terminator.clone())
                .with_renewal_timeout(session_config.refresh_timeout_in_ms.map(Duration::from_millis)),
        ));

        Self::new(session, client, renewer, terminator, navigator)
    }

    pub fn session(&self) -> Session {
        self.session.session()
    }

    pub fn state(&self) -> &SessionState {
        &self.session
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// The logout path shared with the interceptor chain and the cross-tab listener.
    pub fn terminator(&self) -> Arc<dyn LogoutHandler> {
        self.terminator.clone()
    }

    /// Exchanges credentials for an access token. Returns whether the user is now signed in.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        self.session.set_loading(true);

        let request = ApiRequest::post(AUTH_PATH, credentials.to_payload()).without_auth_recovery();
        let outcome = match self.client.send(request).await {
            Ok(response) => response.json::<TokenResponse>(),
            Err(e) => Err(e),
        };

        let signed_in = match outcome {
            Ok(TokenResponse { access_token }) if !access_token.is_empty() => {
                self.session.sign_in(&credentials.username, &access_token);
                info!(
                    event_name = "session.login.succeeded",
                    event_domain = "session",
                    username = credentials.username.as_str(),
                    "user signed in"
                );
                self.navigator.push(DASHBOARD_PATH);
                true
            }
            Ok(_) => {
                self.login_failed(credentials, &ApiError::InvalidResponse("empty access token".into()));
                false
            }
            Err(e) => {
                self.login_failed(credentials, &e);
                false
            }
        };

        self.session.set_loading(false);
        signed_in
    }

    fn login_failed(&self, credentials: &Credentials, error: &ApiError) {
        self.session.reset();
        warn!(
            event_name = "session.login.failed",
            event_domain = "session",
            username = credentials.username.as_str(),
            status = ?error.status(),
            "login rejected: {}",
            error
        );
    }

    /// Creates an account. The session is untouched either way; success moves to the login page.
    pub async fn register(&self, credentials: &Credentials) -> bool {
        let request =
            ApiRequest::post(REGISTER_API_PATH, credentials.to_payload()).without_auth_recovery();

        match self.client.send(request).await {
            Ok(_) => {
                info!(
                    event_name = "session.register.succeeded",
                    event_domain = "session",
                    username = credentials.username.as_str(),
                    "account created"
                );
                self.navigator.push(LOGIN_PATH);
                true
            }
            Err(e) => {
                warn!(
                    event_name = "session.register.failed",
                    event_domain = "session",
                    username = credentials.username.as_str(),
                    status = ?e.status(),
                    "registration rejected: {}",
                    e
                );
                false
            }
        }
    }

    pub fn logout(&self) {
        self.terminator.logout();
    }

    pub fn update_access_token(&self, token: &str) {
        self.session.update_access_token(token);
    }

    /// Silent renewal. Failure leaves the session as it was.
    pub async fn refresh_token(&self) -> bool {
        match self.renewer.renew(&self.client).await {
            Ok(_) => {
                debug!("Access token refreshed");
                true
            }
            Err(e) => {
                info!(
                    event_name = "session.refresh.failed",
                    event_domain = "session",
                    status = ?e.status(),
                    "silent token refresh failed: {}",
                    e
                );
                false
            }
        }
    }

    /// Reads the employee list through the full interceptor chain.
    /// `None` when the list could not be loaded; the failure is logged here.
    pub async fn get_employees(&self) -> Option<Vec<Employee>> {
        match self.client.get_json::<Vec<Employee>>(EMPLOYEES_PATH).await {
            Ok(employees) => {
                debug!(
                    event_name = "session.employees.loaded",
                    event_domain = "session",
                    count = employees.len(),
                    "employees loaded"
                );
                Some(employees)
            }
            Err(e) => {
                warn!(
                    event_name = "session.employees.failed",
                    event_domain = "session",
                    status = ?e.status(),
                    "could not load employees: {}",
                    e
                );
                None
            }
        }
    }
}
