//! The auth interceptor chain: bearer injection and single-flight refresh-and-retry.

pub mod auth;
pub mod refresh_gate;

pub use auth::AuthInterceptor;
pub use refresh_gate::{RefreshGate, RefreshPermit, RefreshPhase};
