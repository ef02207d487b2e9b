//! Read-only overviews for students and administrators.

use chrono::Utc;

use crate::api::{AdminApi, ElectionApi};
use crate::error::Result;
use crate::model::{AdminDashboard, Election, ElectionPhase, ElectionStatus, VoteRecord};

/// Number of recent entries shown on a dashboard.
pub const RECENT: usize = 5;

/// Elections grouped the way the student election list shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElectionListing {
    pub active: Vec<Election>,
    pub upcoming: Vec<Election>,
    pub past: Vec<Election>,
}

impl ElectionListing {
    pub fn load<A: ElectionApi + ?Sized>(api: &A) -> Result<Self> {
        Ok(Self {
            active: api.elections(ElectionPhase::Active)?,
            upcoming: api.elections(ElectionPhase::Upcoming)?,
            past: api.elections(ElectionPhase::Past)?,
        })
    }

    /// Groups with their headings, in display order.
    pub fn groups(&self) -> [(&'static str, &[Election]); 3] {
        [
            ("Active", self.active.as_slice()),
            ("Upcoming", self.upcoming.as_slice()),
            ("Past", self.past.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentDashboard {
    pub upcoming: Vec<Election>,
    pub active: Vec<Election>,
    pub history: Vec<VoteRecord>,
}

impl StudentDashboard {
    pub fn load<A: ElectionApi + ?Sized>(api: &A) -> Result<Self> {
        Ok(Self {
            upcoming: api.elections(ElectionPhase::Upcoming)?,
            active: api.elections(ElectionPhase::Active)?,
            history: api.my_votes()?,
        })
    }

    pub fn recent_votes(&self) -> &[VoteRecord] {
        &self.history[..self.history.len().min(RECENT)]
    }
}

/// The admin overview. Deployments without `/admin/dashboard` get counters
/// derived from the plain election list; if that fails too, everything is zero.
pub fn admin_dashboard<A: AdminApi + ElectionApi + ?Sized>(api: &A) -> AdminDashboard {
    let err = match api.dashboard() {
        Ok(dashboard) => return dashboard,
        Err(err) => err,
    };
    log::warn!("Admin dashboard unavailable, falling back to the election list: {err}");

    let now = Utc::now();
    match api.all_elections() {
        Ok(elections) => AdminDashboard {
            total_elections: elections.len() as u64,
            active_elections: elections
                .iter()
                .filter(|e| e.status_at(now) == ElectionStatus::Active)
                .count() as u64,
            recent_elections: elections.into_iter().take(RECENT).collect(),
            ..Default::default()
        },
        Err(err) => {
            log::error!("Fallback election list failed as well: {err}");
            AdminDashboard::default()
        }
    }
}

/// Elections an administrator can attach candidates to.
pub fn candidate_elections<A: AdminApi + ?Sized>(api: &A) -> Result<Vec<Election>> {
    api.admin_elections(None).or_else(|err| {
        log::warn!("Admin election list failed, trying all-elections: {err}");
        api.admin_all_elections()
    })
}
