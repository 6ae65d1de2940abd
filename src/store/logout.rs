use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::base::LogoutHandler;
use crate::navigation::{Navigator, LOGIN_PATH};
use crate::signal::SignalPort;
use crate::state::SessionState;

/// The single logout path shared by the store, the interceptor chain and the
/// cross-tab listener.
pub struct SessionTerminator {
    session: SessionState,
    signals: SignalPort,
    navigator: Arc<dyn Navigator>,
    signal_key: String,
}

impl SessionTerminator {
    pub fn new(
        session: SessionState,
        signals: SignalPort,
        navigator: Arc<dyn Navigator>,
        signal_key: impl Into<String>,
    ) -> Self {
        SessionTerminator {
            session,
            signals,
            navigator,
            signal_key: signal_key.into(),
        }
    }
}

impl LogoutHandler for SessionTerminator {
    fn logout(&self) {
        let username = self.session.session().username;
        self.session.reset();

        // The write is the event sibling contexts react to; the key itself is not meant to persist.
        let stamp = Utc::now().timestamp_millis().to_string();
        self.signals.set_item(&self.signal_key, &stamp);
        self.navigator.push(LOGIN_PATH);
        self.signals.remove_item(&self.signal_key);

        info!(
            event_name = "session.logout",
            event_domain = "session",
            username = username.as_str(),
            signal = stamp.as_str(),
            "session ended"
        );
    }
}
