use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Where the customer API lives and how requests to it are sent.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ApiConfig {
    /// Base URL every request path is appended to, e.g. "http://localhost:3500".
    pub base_url: String,
    /// Per-request timeout. No timeout when absent.
    #[serde(default)]
    pub timeout_in_ms: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
}
