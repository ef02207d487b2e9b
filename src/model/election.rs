use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Id;

/// An election as described by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    #[serde(rename = "_id")]
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: ElectionCategory,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Derived by the server; absent on some older endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ElectionStatus>,
}

impl Election {
    /// The server's status if it sent one, otherwise derived from the dates.
    pub fn status_at(&self, now: DateTime<Utc>) -> ElectionStatus {
        self.status.unwrap_or(if now < self.start_date {
            ElectionStatus::Upcoming
        } else if now < self.end_date {
            ElectionStatus::Active
        } else {
            ElectionStatus::Completed
        })
    }

    /// Description cut to `max` characters for list views.
    pub fn summary(&self, max: usize) -> String {
        if self.description.chars().count() > max {
            let cut: String = self.description.chars().take(max).collect();
            format!("{cut}...")
        } else {
            self.description.clone()
        }
    }
}

/// Election category. Unknown categories are kept as sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElectionCategory {
    Sug,
    Faculty,
    Department,
    Other(String),
}

impl From<String> for ElectionCategory {
    fn from(category: String) -> Self {
        match category.to_lowercase().as_str() {
            "sug" => Self::Sug,
            "faculty" => Self::Faculty,
            "department" => Self::Department,
            _ => Self::Other(category),
        }
    }
}

impl From<ElectionCategory> for String {
    fn from(category: ElectionCategory) -> Self {
        category.to_string()
    }
}

impl Display for ElectionCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sug => write!(f, "SUG"),
            Self::Faculty => write!(f, "Faculty"),
            Self::Department => write!(f, "Department"),
            Self::Other(other) => write!(f, "{other}"),
        }
    }
}

impl std::str::FromStr for ElectionCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// Lifecycle status, owned by the server.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionStatus {
    Upcoming,
    Active,
    Completed,
}

impl Display for ElectionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

/// The election listings the API can filter by.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ElectionPhase {
    Active,
    Upcoming,
    Past,
    Completed,
}

impl ElectionPhase {
    /// Path segment under `/elections/` (and `/admin/elections/`).
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Upcoming => "upcoming",
            Self::Past => "past",
            Self::Completed => "completed",
        }
    }
}

/// Create/update payload for admin election management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionForm {
    pub title: String,
    pub description: String,
    pub category: ElectionCategory,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl ElectionForm {
    /// Reject forms the server would reject anyway.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Election title is required".to_string());
        }
        if self.end_date <= self.start_date {
            return Err("Election must end after it starts".to_string());
        }
        Ok(())
    }
}

impl From<&Election> for ElectionForm {
    fn from(election: &Election) -> Self {
        Self {
            title: election.title.clone(),
            description: election.description.clone(),
            category: election.category.clone(),
            start_date: election.start_date,
            end_date: election.end_date,
        }
    }
}


#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_wire_shape() {
        let election: Election = serde_json::from_value(json!({
            "_id": "e1",
            "title": "Faculty Rep",
            "description": "desc",
            "category": "faculty",
            "startDate": "2026-03-01T08:00:00Z",
            "endDate": "2026-03-02T18:00:00Z",
            "status": "upcoming",
        }))
        .unwrap();
        assert_eq!(election.category, ElectionCategory::Faculty);
        assert_eq!(election.status, Some(ElectionStatus::Upcoming));
    }

    #[test]
    fn unknown_category_is_preserved() {
        let category: ElectionCategory = serde_json::from_value(json!("Hostel")).unwrap();
        assert_eq!(category, ElectionCategory::Other("Hostel".to_string()));
        assert_eq!(serde_json::to_value(&category).unwrap(), json!("Hostel"));
        assert_eq!(
            serde_json::to_value(ElectionCategory::Sug).unwrap(),
            json!("SUG")
        );
    }

    #[test]
    fn status_derived_when_missing() {
        let mut election = Election::example();
        election.status = None;
        let before = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let during = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(election.status_at(before), ElectionStatus::Upcoming);
        assert_eq!(election.status_at(during), ElectionStatus::Active);
        assert_eq!(election.status_at(after), ElectionStatus::Completed);
    }

    #[test]
    fn form_validation() {
        let mut form = ElectionForm::from(&Election::example());
        assert!(form.validate().is_ok());
        form.end_date = form.start_date;
        assert!(form.validate().is_err());
    }

    #[test]
    fn summary_truncates() {
        let mut election = Election::example();
        election.description = "x".repeat(120);
        assert_eq!(election.summary(100).len(), 103);
        election.description = "short".to_string();
        assert_eq!(election.summary(100), "short");
    }
}
