//! The API client: a transport plus interceptable request and response phases.

pub mod client;
pub mod error;
pub mod request;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{HttpClient, Interceptor};
pub use error::ApiError;
pub use request::{ApiRequest, ApiResponse};
pub use transport::{ReqwestTransport, Transport};
