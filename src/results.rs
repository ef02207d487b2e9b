//! Display projections of precomputed election results.
//!
//! The server tallies and orders the results; nothing here re-sorts or
//! recounts beyond the total and the percentages.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::api::ElectionApi;
use crate::model::{CandidateResult, Election, ElectionPhase, Id};

/// Series colours for the pie chart, cycled when there are more candidates.
pub const PALETTE: [Rgb; 7] = [
    Rgb(54, 162, 235),
    Rgb(255, 99, 132),
    Rgb(255, 206, 86),
    Rgb(75, 192, 192),
    Rgb(153, 102, 255),
    Rgb(255, 159, 64),
    Rgb(199, 199, 199),
];

/// Colour of the single bar chart series.
pub const BAR_COLOUR: Rgb = Rgb(99, 102, 241);

const FILL_ALPHA: f32 = 0.6;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// CSS `rgba()` notation with the given opacity.
    pub fn rgba(&self, alpha: f32) -> String {
        format!("rgba({}, {}, {}, {alpha})", self.0, self.1, self.2)
    }
}

/// One line of the ranked results table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub rank: usize,
    pub candidate: String,
    pub position: String,
    pub votes: u64,
    /// Share of the total, always with two decimals.
    pub percentage: String,
}

/// Pie projection: one slice per candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
    pub background: Vec<String>,
    pub border: Vec<String>,
}

/// Bar projection: a single vote-count series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub labels: Vec<String>,
    pub series: &'static str,
    pub data: Vec<u64>,
    pub background: String,
    pub border: String,
}

/// Results of one election, in the order the server ranked them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    results: Vec<CandidateResult>,
    total: u64,
}

impl ResultsView {
    pub fn new(results: Vec<CandidateResult>) -> Self {
        let total = results.iter().map(|r| r.vote_count).sum();
        Self { results, total }
    }

    pub fn total_votes(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// `votes` as a percentage of the total, rounded to two decimals.
    /// With no votes cast at all every share is `0.00`.
    pub fn percentage(&self, votes: u64) -> String {
        if self.total == 0 {
            return "0.00".to_string();
        }
        format!("{:.2}", votes as f64 / self.total as f64 * 100.0)
    }

    /// The server's first-ranked candidate, as "First Last (N votes)".
    pub fn winner(&self) -> Option<String> {
        self.results
            .first()
            .map(|r| format!("{} ({} votes)", r.candidate.full_name(), r.vote_count))
    }

    pub fn rows(&self) -> Vec<Row> {
        self.results
            .iter()
            .enumerate()
            .map(|(i, r)| Row {
                rank: i + 1,
                candidate: r.candidate.full_name(),
                position: r.candidate.position.clone(),
                votes: r.vote_count,
                percentage: self.percentage(r.vote_count),
            })
            .collect()
    }

    fn labels(&self) -> Vec<String> {
        self.results.iter().map(|r| r.candidate.full_name()).collect()
    }

    fn counts(&self) -> Vec<u64> {
        self.results.iter().map(|r| r.vote_count).collect()
    }

    pub fn pie_chart(&self) -> PieChart {
        let colours = || PALETTE.iter().cycle().take(self.results.len());
        PieChart {
            labels: self.labels(),
            data: self.counts(),
            background: colours().map(|c| c.rgba(FILL_ALPHA)).collect(),
            border: colours().map(|c| c.rgba(1.0)).collect(),
        }
    }

    pub fn bar_chart(&self) -> BarChart {
        BarChart {
            labels: self.labels(),
            series: "Votes",
            data: self.counts(),
            background: BAR_COLOUR.rgba(FILL_ALPHA),
            border: BAR_COLOUR.rgba(1.0),
        }
    }
}

impl Display for ResultsView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return writeln!(f, "No results available for this election.");
        }
        writeln!(f, "Total votes: {}", self.total)?;
        if let Some(winner) = self.winner() {
            writeln!(f, "Winner: {winner}")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:<5} {:<30} {:<20} {:>7} {:>10}",
            "Rank", "Candidate", "Position", "Votes", "Percentage"
        )?;
        for row in self.rows() {
            writeln!(
                f,
                "{:<5} {:<30} {:<20} {:>7} {:>9}%",
                row.rank, row.candidate, row.position, row.votes, row.percentage
            )?;
        }
        Ok(())
    }
}

/// The results screen: completed elections and the one being shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsPage {
    NoCompletedElections,
    Ready {
        elections: Vec<Election>,
        selected: Election,
        results: Result<ResultsView, String>,
    },
    Failed(String),
}

impl ResultsPage {
    /// Load completed elections and the results of `requested`, falling back
    /// to the first completed election when it is absent or unknown.
    pub fn load<A: ElectionApi + ?Sized>(api: &A, requested: Option<&Id>) -> Self {
        let elections = match api.elections(ElectionPhase::Completed) {
            Ok(elections) => elections,
            Err(err) => {
                log::warn!("Could not load completed elections: {err}");
                return Self::Failed(err.user_message("Failed to load elections"));
            }
        };

        let selected = requested
            .and_then(|id| elections.iter().find(|e| &e.id == id))
            .or_else(|| elections.first())
            .cloned();
        let Some(selected) = selected else {
            return Self::NoCompletedElections;
        };

        let results = api.results(&selected.id).map(ResultsView::new).map_err(|err| {
            log::warn!("Could not load results for {}: {err}", selected.id);
            err.user_message("Failed to load election results")
        });
        Self::Ready {
            elections,
            selected,
            results,
        }
    }
}
