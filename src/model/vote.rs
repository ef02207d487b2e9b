use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::Id;

/// The server's view of what the current user may still vote for in one election.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteEligibility {
    pub has_voted: bool,
    #[serde(deserialize_with = "null_as_empty")]
    pub voted_positions: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub available_positions: Vec<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub remaining_positions: Vec<String>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl VoteEligibility {
    pub fn all_positions_voted(&self) -> bool {
        self.remaining_positions.is_empty()
    }
}

/// A single vote: one candidate for the position that candidate stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub election_id: Id,
    pub candidate_id: Id,
}

/// One entry of the current user's voting history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    #[serde(rename = "_id")]
    pub id: Id,
    pub election: VotedElection,
    pub candidate: VotedCandidate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotedElection {
    #[serde(rename = "_id", default)]
    pub id: Id,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotedCandidate {
    #[serde(rename = "_id", default)]
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub position: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_arrays_read_as_empty() {
        let eligibility: VoteEligibility =
            serde_json::from_value(json!({ "hasVoted": false })).unwrap();
        assert!(eligibility.available_positions.is_empty());
        assert!(eligibility.all_positions_voted());
    }

    #[test]
    fn null_arrays_read_as_empty() {
        let eligibility: VoteEligibility = serde_json::from_str(
            r#"{"hasVoted":true,"votedPositions":null,"availablePositions":null,"remainingPositions":["Treasurer"]}"#,
        )
        .unwrap();
        assert!(eligibility.voted_positions.is_empty());
        assert!(eligibility.available_positions.is_empty());
        assert_eq!(eligibility.remaining_positions, vec!["Treasurer"]);
    }

    #[test]
    fn vote_request_wire_shape() {
        let request = VoteRequest {
            election_id: Id::from("e1"),
            candidate_id: Id::from("c1"),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "electionId": "e1", "candidateId": "c1" })
        );
    }
}
