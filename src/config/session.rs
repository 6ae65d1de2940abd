use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Session behaviour: startup refresh, renewal timeout and the cross-tab signal key.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
#[serde(default)]
pub struct SessionConfig {
    /// Try one silent token refresh before the front end starts.
    pub refresh_on_startup: bool,
    /// Upper bound for a token renewal triggered by a 403. Unbounded when absent.
    pub refresh_timeout_in_ms: Option<u64>,
    /// Shared storage key written on logout and watched by sibling contexts.
    pub signal_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            refresh_on_startup: true,
            refresh_timeout_in_ms: None,
            signal_key: "logout".to_string(),
        }
    }
}
