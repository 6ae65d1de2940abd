//! Library exports for sessiontron, shared between the binary and tests.

pub mod config;
pub mod http;
pub mod interceptor;
pub mod models;
pub mod navigation;
pub mod shell;
pub mod signal;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
