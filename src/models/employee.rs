use serde::{Deserialize, Serialize};

/// A row of the `/employees` listing shown on the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
}
