use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::debug;

use super::guard::{require_auth, GuardDecision};
use super::route::Route;
use crate::state::SessionState;

pub const HISTORY_LIMIT: usize = 50;

/// Something that can move the application to another path.
pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}

/// Where navigation ended up after guards ran.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub route: Route,
}

impl Location {
    fn at(path: &str) -> Self {
        Location {
            path: path.to_string(),
            route: Route::resolve(path),
        }
    }
}

/// In-memory router: resolves paths against the route table, consults the auth
/// guard before entering protected routes, and keeps the last
/// [`HISTORY_LIMIT`] locations entered.
pub struct Router {
    session: SessionState,
    history: Mutex<VecDeque<Location>>,
}

impl Router {
    pub fn new(session: SessionState) -> Self {
        Router {
            session,
            history: Mutex::new(VecDeque::with_capacity(HISTORY_LIMIT)),
        }
    }

    /// Navigates to `path` and returns the location actually entered.
    pub fn navigate(&self, path: &str) -> Location {
        let mut location = Location::at(path);

        if location.route.is_protected() {
            if let GuardDecision::Redirect(target) = require_auth(&self.session.session()) {
                debug!(
                    "Navigation to '{}' redirected to '{}': not authenticated",
                    path, target
                );
                location = Location::at(target);
            }
        }

        debug!("Entering route {} at '{}'", location.route.name(), location.path);
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        if history.len() == HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(location.clone());
        location
    }

    pub fn current(&self) -> Option<Location> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    pub fn current_route(&self) -> Option<Route> {
        self.current().map(|location| location.route)
    }

    /// Oldest first.
    pub fn history(&self) -> Vec<Location> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Navigator for Router {
    fn push(&self, path: &str) {
        self.navigate(path);
    }
}
