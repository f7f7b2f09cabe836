//! Household Model

use serde::{Deserialize, Serialize};

/// A group of users sharing receipt data (tenant/workspace)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}
