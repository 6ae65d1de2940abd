use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::bus::SignalPort;
use crate::store::LogoutHandler;

/// One-shot listener that logs this context out when another context signals a logout.
///
/// The first change to the watched key triggers `logout` and ends the listener;
/// later signals have no effect. Dropping the listener deregisters it.
pub struct LogoutListener {
    task: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

impl LogoutListener {
    /// Subscribes immediately, so signals sent right after registration are not missed.
    pub fn register(port: &SignalPort, key: &str, handler: Arc<dyn LogoutHandler>) -> Self {
        let mut subscription = port.subscribe();
        let context = port.context();
        let key = key.to_string();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_flag = fired.clone();

        let task = tokio::spawn(async move {
            if let Some(event) = subscription.next_for(&key).await {
                info!(
                    event_name = "session.logout.cross_tab",
                    event_domain = "session",
                    context = %context,
                    origin = %event.origin,
                    "logout signalled by another context"
                );
                fired_flag.store(true, Ordering::SeqCst);
                handler.logout();
            }
            debug!("Logout listener for context {} deregistered", context);
        });

        LogoutListener { task, fired }
    }

    pub fn is_registered(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Drop for LogoutListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}
