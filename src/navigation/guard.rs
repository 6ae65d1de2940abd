use crate::models::Session;

use super::route::LOGIN_PATH;

/// Outcome of a navigation guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Gate for protected routes: signed-in sessions proceed, everything else is sent to the login page.
pub fn require_auth(session: &Session) -> GuardDecision {
    if session.is_logged_in && !session.token.is_empty() {
        GuardDecision::Proceed
    } else {
        GuardDecision::Redirect(LOGIN_PATH)
    }
}
