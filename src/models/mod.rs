pub mod credentials;
pub mod employee;
pub mod session;

pub use credentials::{Credentials, TokenResponse};
pub use employee::Employee;
pub use session::Session;
