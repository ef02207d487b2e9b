//! Wire types exchanged with the voting API.

mod candidate;
mod dashboard;
mod directory;
mod election;
mod id;
mod results;
mod user;
mod vote;

pub use candidate::{Candidate, CandidateElection, CandidateForm, CandidatesByPosition};
pub use dashboard::AdminDashboard;
pub use directory::{Department, DepartmentForm, Faculty, FacultyForm};
pub use election::{Election, ElectionCategory, ElectionForm, ElectionPhase, ElectionStatus};
pub use id::{Id, Named, Ref};
pub use results::CandidateResult;
pub use user::{
    Credentials, LoginResponse, ProfileUpdate, Registration, Role, User, UserUpdate,
};
pub use vote::{VoteEligibility, VoteRecord, VoteRequest, VotedCandidate, VotedElection};
