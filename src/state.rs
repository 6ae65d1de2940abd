//! Shared session state.
//!
//! Holds the one piece of authoritative client state: who is signed in, with
//! which access token, and whether a login call is in flight. The handle is
//! cloned into the session store, the interceptor chain and the router; every
//! mutation is applied as a single step so readers never observe a half-updated
//! session.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::models::Session;

/// Everything a reader can observe at one point in time.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Session,
    /// True strictly while a login call is in flight.
    pub loading_session: bool,
    /// Bumped whenever a session starts or ends, never by a token update.
    #[serde(skip)]
    generation: u64,
}

/// Cloneable handle to the session owned by an application instance.
#[derive(Clone)]
pub struct SessionState {
    tx: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionState {
    /// Creates a new handle in the anonymous default.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        SessionState { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    pub fn session(&self) -> Session {
        self.tx.borrow().user.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.tx.borrow().loading_session
    }

    /// The bearer token to attach to outgoing requests, if any.
    pub fn access_token(&self) -> Option<String> {
        let snapshot = self.tx.borrow();
        if snapshot.user.token.is_empty() {
            None
        } else {
            Some(snapshot.user.token.clone())
        }
    }

    /// Receives every settled snapshot; used by front ends to re-render.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    pub fn set_loading(&self, loading: bool) {
        self.tx.send_if_modified(|snapshot| {
            let changed = snapshot.loading_session != loading;
            snapshot.loading_session = loading;
            changed
        });
    }

    /// Identifies the current session. A renewal started under one generation
    /// must not apply its token to another.
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Sets user and token after a successful credential exchange and ends the loading phase.
    pub fn sign_in(&self, username: &str, token: &str) {
        self.tx.send_modify(|snapshot| {
            snapshot.user = Session::authenticated(username, token);
            snapshot.loading_session = false;
            snapshot.generation += 1;
        });
    }

    /// Replaces the access token, keeping the username.
    pub fn update_access_token(&self, token: &str) {
        self.tx.send_modify(|snapshot| {
            snapshot.user = snapshot.user.with_token(token);
        });
    }

    /// Replaces the access token only if the session is still the one of
    /// `generation`. Returns whether the token was applied.
    pub fn update_access_token_for(&self, generation: u64, token: &str) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.generation != generation {
                return false;
            }
            snapshot.user = snapshot.user.with_token(token);
            true
        })
    }

    /// Back to the anonymous default. The loading flag is left to the login call that owns it.
    pub fn reset(&self) {
        self.tx.send_modify(|snapshot| {
            snapshot.user = Session::anonymous();
            snapshot.generation += 1;
        });
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
