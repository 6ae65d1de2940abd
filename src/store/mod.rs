pub mod base;
pub mod logout;
pub mod renewer;
pub mod session_store;

pub use base::{LogoutHandler, TokenRenewer};
pub use logout::SessionTerminator;
pub use renewer::{RefreshEndpoint, REFRESH_PATH};
pub use session_store::SessionStore;
