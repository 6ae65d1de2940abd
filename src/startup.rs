//! Application assembly and startup.
//!
//! An [`App`] is one browsing context: its own session, router, API client and
//! store, plus the cross-tab logout listener attached to a shared [`SignalBus`].
//! Several apps may share one bus; they then behave like tabs of one origin.

use std::sync::Arc;

use tracing::info;

use crate::config::ConfigV1;
use crate::http::{ApiError, ReqwestTransport, Transport};
use crate::navigation::{Location, Navigator, Router, DASHBOARD_PATH};
use crate::shell;
use crate::signal::{LogoutListener, SignalBus, SignalPort};
use crate::state::SessionState;
use crate::store::SessionStore;

pub struct App {
    config: Arc<ConfigV1>,
    session: SessionState,
    router: Arc<Router>,
    store: Arc<SessionStore>,
    signals: SignalPort,
    listener: LogoutListener,
}

impl App {
    /// Assembles an app over the given transport. Must be called inside a tokio
    /// runtime: the logout listener is registered right away.
    pub fn with_transport(
        config: Arc<ConfigV1>,
        bus: &SignalBus,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let session = SessionState::new();
        let router = Arc::new(Router::new(session.clone()));
        let signals = bus.port();
        let navigator: Arc<dyn Navigator> = router.clone();

        let store = Arc::new(SessionStore::connect(
            session.clone(),
            transport,
            signals.clone(),
            navigator,
            &config.session,
        ));
        let listener = LogoutListener::register(
            &signals,
            &config.session.signal_key,
            store.terminator(),
        );

        info!(
            "App context {} ready, API at {}",
            signals.context(),
            config.api.base_url
        );

        App {
            config,
            session,
            router,
            store,
            signals,
            listener,
        }
    }

    /// Assembles an app talking to `api.base_url` over HTTP.
    pub fn build(config: Arc<ConfigV1>, bus: &SignalBus) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(&config.api)?;
        Ok(Self::with_transport(config, bus, Arc::new(transport)))
    }

    /// Restores the session if configured to, then enters `initial_path`.
    pub async fn start(&self, initial_path: &str) -> Location {
        if self.config.session.refresh_on_startup && self.store.refresh_token().await {
            info!(
                event_name = "session.restored",
                event_domain = "session",
                "session restored from refresh cookie"
            );
        }
        self.router.navigate(initial_path)
    }

    pub fn config(&self) -> &ConfigV1 {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn signals(&self) -> &SignalPort {
        &self.signals
    }

    pub fn listener(&self) -> &LogoutListener {
        &self.listener
    }
}

/// Starts a single context and hands it to the console front end.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or stdin fails.
pub async fn run(config: Arc<ConfigV1>) -> Result<(), Box<dyn std::error::Error>> {
    let bus = SignalBus::new();
    let app = App::build(config, &bus)?;

    let location = app.start(DASHBOARD_PATH).await;
    info!("Started at {} ({})", location.path, location.route.name());

    shell::run(&app).await?;
    Ok(())
}
