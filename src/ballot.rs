//! Sequential, position-by-position voting in one election.
//!
//! A ballot loads the server's view of what the user may still vote for and
//! walks the remaining positions one at a time. Each position is submitted on
//! its own; the server stays the authority on what has been voted.

use std::collections::HashMap;

use thiserror::Error;

use crate::api::ElectionApi;
use crate::error::Error;
use crate::model::{Candidate, CandidatesByPosition, Election, Id, VoteEligibility, VoteRequest};

const LOAD_FAILED: &str = "Failed to load election data";
const SUBMIT_FAILED: &str = "Failed to submit your vote";

/// Why a ballot action was refused. Everything but [`BallotError::Rejected`]
/// is decided locally, before any request is made.
#[derive(Debug, Error)]
pub enum BallotError {
    #[error("The ballot is not open for voting")]
    NotVoting,
    #[error("Please select a candidate for {0}")]
    NoSelection(String),
    #[error("You have already voted for {0}")]
    AlreadyVoted(String),
    #[error("{0} is not a position in this election")]
    UnknownPosition(String),
    #[error("Candidate {candidate} is not standing for {position}")]
    UnknownCandidate { candidate: Id, position: String },
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: Error,
    },
}

impl BallotError {
    /// The underlying API failure, for submissions the server turned down.
    pub fn api_error(&self) -> Option<&Error> {
        match self {
            Self::Rejected { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// What a successful submission led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// The vote was recorded and `next` is now the current position.
    Next { recorded: String, next: String },
    /// That was the last remaining position.
    Completed { recorded: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BallotState {
    Loading,
    Error(String),
    Voting(Voting),
    Completed,
}

/// Progress through the positions of an open ballot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voting {
    election: Election,
    candidates: CandidatesByPosition,
    available: Vec<String>,
    voted: Vec<String>,
    current: String,
    selection: HashMap<String, Id>,
}

impl Voting {
    pub fn election(&self) -> &Election {
        &self.election
    }

    pub fn candidates(&self) -> &CandidatesByPosition {
        &self.candidates
    }

    pub fn current_position(&self) -> &str {
        &self.current
    }

    /// Candidates standing for the current position.
    pub fn current_candidates(&self) -> &[Candidate] {
        self.candidates.get(&self.current)
    }

    pub fn available_positions(&self) -> &[String] {
        &self.available
    }

    pub fn voted_positions(&self) -> &[String] {
        &self.voted
    }

    /// Positions not yet voted, in the server's order.
    pub fn remaining_positions(&self) -> Vec<&str> {
        self.available
            .iter()
            .filter(|position| !self.is_voted(position))
            .map(String::as_str)
            .collect()
    }

    pub fn is_voted(&self, position: &str) -> bool {
        self.voted.iter().any(|p| p == position)
    }

    /// The tentative choice for `position`, if one was made.
    pub fn selection(&self, position: &str) -> Option<&Id> {
        self.selection.get(position)
    }

    /// Voted and available position counts.
    pub fn progress(&self) -> (usize, usize) {
        (self.voted.len(), self.available.len())
    }

    /// Tentatively choose a candidate for the current position.
    pub fn select(&mut self, candidate: &Id) -> Result<(), BallotError> {
        if self.candidates.find(&self.current, candidate).is_none() {
            return Err(BallotError::UnknownCandidate {
                candidate: candidate.clone(),
                position: self.current.clone(),
            });
        }
        self.selection.insert(self.current.clone(), candidate.clone());
        Ok(())
    }

    /// Show another position. Voted positions may be revisited but not resubmitted.
    pub fn switch_position(&mut self, position: &str) -> Result<(), BallotError> {
        if !self.available.iter().any(|p| p == position) {
            return Err(BallotError::UnknownPosition(position.to_string()));
        }
        self.current = position.to_string();
        Ok(())
    }

    /// The vote to send for the current position.
    fn pending_vote(&self) -> Result<VoteRequest, BallotError> {
        if self.is_voted(&self.current) {
            return Err(BallotError::AlreadyVoted(self.current.clone()));
        }
        let candidate = self
            .selection
            .get(&self.current)
            .ok_or_else(|| BallotError::NoSelection(self.current.clone()))?;
        Ok(VoteRequest {
            election_id: self.election.id.clone(),
            candidate_id: candidate.clone(),
        })
    }

    /// Mark the current position voted and move on to the first one remaining.
    fn record_current(&mut self) -> Submitted {
        let recorded = self.current.clone();
        self.voted.push(recorded.clone());
        match self.remaining_positions().first() {
            Some(next) => {
                let next = next.to_string();
                self.current = next.clone();
                Submitted::Next { recorded, next }
            }
            None => Submitted::Completed { recorded },
        }
    }
}

/// The ballot for one election.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    election_id: Id,
    state: BallotState,
}

impl Ballot {
    pub fn new(election_id: Id) -> Self {
        Self {
            election_id,
            state: BallotState::Loading,
        }
    }

    /// Create a ballot and load it straight away.
    pub fn open<A: ElectionApi + ?Sized>(api: &A, election_id: Id) -> Self {
        let mut ballot = Self::new(election_id);
        ballot.load(api);
        ballot
    }

    pub fn election_id(&self) -> &Id {
        &self.election_id
    }

    pub fn state(&self) -> &BallotState {
        &self.state
    }

    pub fn voting(&self) -> Option<&Voting> {
        match &self.state {
            BallotState::Voting(voting) => Some(voting),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == BallotState::Completed
    }

    /// Ask the server for eligibility, the election and its candidates, and
    /// start over from what it says. Nothing from a previous load is kept.
    pub fn load<A: ElectionApi + ?Sized>(&mut self, api: &A) -> &BallotState {
        self.state = BallotState::Loading;
        self.state = match self.fetch(api) {
            Ok(state) => state,
            Err(err) => {
                log::warn!("Could not load ballot for {}: {err}", self.election_id);
                BallotState::Error(load_message(&err))
            }
        };
        &self.state
    }

    fn fetch<A: ElectionApi + ?Sized>(&self, api: &A) -> crate::error::Result<BallotState> {
        let eligibility = api.eligibility(&self.election_id)?;
        let election = api.election(&self.election_id)?;
        let candidates = api.candidates(&self.election_id)?;

        let Some(current) = eligibility.remaining_positions.first().cloned() else {
            log::info!("All positions in {} already voted", self.election_id);
            return Ok(BallotState::Completed);
        };
        let available = available_positions(&eligibility);
        Ok(BallotState::Voting(Voting {
            election,
            candidates: CandidatesByPosition::group(candidates),
            available,
            voted: eligibility.voted_positions,
            current,
            selection: HashMap::new(),
        }))
    }

    pub fn select(&mut self, candidate: &Id) -> Result<(), BallotError> {
        self.voting_mut()?.select(candidate)
    }

    pub fn switch_position(&mut self, position: &str) -> Result<(), BallotError> {
        self.voting_mut()?.switch_position(position)
    }

    /// Send the tentative choice for the current position.
    ///
    /// Taking `&mut self` keeps at most one submission in flight per ballot.
    /// A rejected submission leaves the position, the selection and the voted
    /// positions as they were.
    pub fn submit<A: ElectionApi + ?Sized>(&mut self, api: &A) -> Result<Submitted, BallotError> {
        let voting = self.voting_mut()?;
        let vote = voting.pending_vote()?;

        if let Err(err) = api.cast_vote(&vote) {
            log::warn!("Vote for {} rejected: {err}", voting.current);
            return Err(BallotError::Rejected {
                message: err.user_message(SUBMIT_FAILED),
                source: err,
            });
        }

        let submitted = voting.record_current();
        log::info!("Vote recorded in {}: {submitted:?}", self.election_id);
        if let Submitted::Completed { .. } = submitted {
            self.state = BallotState::Completed;
        }
        Ok(submitted)
    }

    fn voting_mut(&mut self) -> Result<&mut Voting, BallotError> {
        match &mut self.state {
            BallotState::Voting(voting) => Ok(voting),
            _ => Err(BallotError::NotVoting),
        }
    }
}

/// Every position of the election. Older servers leave `availablePositions`
/// empty, in which case it is rebuilt from the voted and remaining ones.
fn available_positions(eligibility: &VoteEligibility) -> Vec<String> {
    if !eligibility.available_positions.is_empty() {
        return eligibility.available_positions.clone();
    }
    let mut available = eligibility.voted_positions.clone();
    for position in &eligibility.remaining_positions {
        if !available.contains(position) {
            available.push(position.clone());
        }
    }
    available
}

fn load_message(err: &Error) -> String {
    match err {
        Error::NotFound(_) => "Election not found".to_string(),
        Error::Forbidden(_) => "You are not authorized to vote in this election".to_string(),
        other => other.user_message(LOAD_FAILED),
    }
}
