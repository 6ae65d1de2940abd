//! Cross-context signalling: a shared key-value bus and the one-shot logout listener.

pub mod bus;
pub mod listener;

pub use bus::{ContextId, SignalBus, SignalPort, SignalSubscription, StorageEvent};
pub use listener::LogoutListener;
