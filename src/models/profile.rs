//! Account-level profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile stored per account (document ID is the owner ID).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub owner_id: String,
    pub full_name: Option<String>,
    /// Username shared across platforms, used by link auto-sync
    pub global_username: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn empty(owner_id: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            full_name: None,
            global_username: None,
            updated_at: Utc::now(),
        }
    }
}
