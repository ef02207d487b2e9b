use serde::{Deserialize, Serialize};

use super::Candidate;

/// Precomputed tally for one candidate, as returned by `/elections/{id}/results`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub candidate: Candidate,
    pub vote_count: u64,
}
