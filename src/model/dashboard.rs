use serde::{Deserialize, Serialize};

use super::{Election, User};

/// Aggregate counters and recent activity for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminDashboard {
    pub total_users: u64,
    pub total_elections: u64,
    pub active_elections: u64,
    pub total_candidates: u64,
    pub total_votes: u64,
    pub recent_elections: Vec<Election>,
    pub recent_users: Vec<User>,
}
