use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{ElectionCategory, Id, Ref};

/// A candidate standing for one position in one election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub matric_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub position: String,
    #[serde(default)]
    pub manifesto: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub election_id: Option<Id>,
    /// Sent by some endpoints as a bare id, by others populated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub election: Option<Ref<CandidateElection>>,
}

/// The election a candidate stands in, as embedded in candidate listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateElection {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ElectionCategory>,
}

impl Candidate {
    /// The election id, from whichever of `electionId` and `election` was sent.
    pub fn election_ref(&self) -> Option<&Id> {
        self.election_id
            .as_ref()
            .or_else(|| match self.election.as_ref()? {
                Ref::Id(id) => Some(id),
                Ref::Embedded(election) => Some(&election.id),
            })
    }

    /// Title of the embedded election, if the server populated it.
    pub fn election_title(&self) -> Option<&str> {
        match self.election.as_ref()? {
            Ref::Embedded(election) if !election.title.is_empty() => Some(&election.title),
            _ => None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// First 150 characters of the manifesto, as shown on the ballot.
    pub fn manifesto_excerpt(&self) -> String {
        let excerpt: String = self.manifesto.chars().take(150).collect();
        format!("{excerpt}...")
    }
}

/// Candidates of one election, grouped by the position they stand for.
/// Groups keep the order in which positions first appear in the server's list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatesByPosition {
    groups: Vec<(String, Vec<Candidate>)>,
}

impl CandidatesByPosition {
    pub fn group(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let mut grouped = Self::default();
        for candidate in candidates {
            match grouped
                .groups
                .iter_mut()
                .find(|(position, _)| *position == candidate.position)
            {
                Some((_, group)) => group.push(candidate),
                None => grouped
                    .groups
                    .push((candidate.position.clone(), vec![candidate])),
            }
        }
        grouped
    }

    /// Candidates for `position`; empty if nobody stands for it.
    pub fn get(&self, position: &str) -> &[Candidate] {
        self.groups
            .iter()
            .find(|(p, _)| p == position)
            .map(|(_, group)| group.as_slice())
            .unwrap_or(&[])
    }

    pub fn find(&self, position: &str, candidate_id: &Id) -> Option<&Candidate> {
        self.get(position).iter().find(|c| &c.id == candidate_id)
    }

    pub fn positions(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(position, _)| position.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Create/update payload for admin candidate management, sent as multipart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateForm {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub matric_number: String,
    pub position: String,
    pub manifesto: String,
    pub election_id: Id,
    pub profile_image: Option<PathBuf>,
}

impl CandidateForm {
    /// Text fields in wire naming; absent optional fields are skipped.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("firstName", self.first_name.clone()),
            ("lastName", self.last_name.clone()),
            ("matricNumber", self.matric_number.clone()),
            ("position", self.position.clone()),
            ("manifesto", self.manifesto.clone()),
            ("electionId", self.election_id.to_string()),
        ];
        if let Some(email) = &self.email {
            fields.push(("email", email.clone()));
        }
        fields
    }
}

#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    impl Candidate {
        pub fn example(id: &str, position: &str) -> Self {
            Self {
                id: Id::from(id),
                first_name: format!("First{id}"),
                last_name: format!("Last{id}"),
                matric_number: format!("MAT/{id}"),
                email: None,
                position: position.to_string(),
                manifesto: "I will serve.".to_string(),
                profile_image_url: None,
                election_id: Some(Id::from("e1")),
                election: None,
            }
        }
    }
}
