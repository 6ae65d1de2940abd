//! Route table, the auth guard and the in-memory router.

pub mod guard;
pub mod route;
pub mod router;

pub use guard::{require_auth, GuardDecision};
pub use route::{Route, DASHBOARD_PATH, LOGIN_PATH, REGISTER_PATH};
pub use router::{Location, Navigator, Router};
