//! The remote voting API, as consumed by this client.
//!
//! Each trait covers one audience of endpoints. [`HttpClient`] implements all of
//! them over HTTP; tests substitute an in-memory fake.

use crate::error::Result;
use crate::model::{
    AdminDashboard, Candidate, CandidateForm, CandidateResult, Credentials, Department,
    DepartmentForm, Election, ElectionForm, ElectionPhase, Faculty, FacultyForm, Id,
    LoginResponse, ProfileUpdate, Registration, User, UserUpdate, VoteEligibility, VoteRecord,
    VoteRequest,
};
use crate::token::TokenStore;

mod http;

#[cfg(test)]
pub(crate) mod fake;

pub use http::HttpClient;

/// Authentication and the current user's own account.
pub trait AuthApi {
    /// Exchange credentials for a bearer token. Does not store the token.
    fn login(&self, credentials: &Credentials) -> Result<LoginResponse>;

    fn register(&self, registration: &Registration) -> Result<()>;

    /// The user owning the stored token.
    fn me(&self) -> Result<User>;

    fn update_profile(&self, update: &ProfileUpdate) -> Result<User>;

    /// Where the bearer token attached to authenticated requests lives.
    fn tokens(&self) -> &dyn TokenStore;
}

/// What a student needs to browse elections, vote and read results.
pub trait ElectionApi {
    fn elections(&self, phase: ElectionPhase) -> Result<Vec<Election>>;

    /// Every election visible to the user, regardless of phase.
    fn all_elections(&self) -> Result<Vec<Election>>;

    fn election(&self, id: &Id) -> Result<Election>;

    fn candidates(&self, election: &Id) -> Result<Vec<Candidate>>;

    fn eligibility(&self, election: &Id) -> Result<VoteEligibility>;

    fn cast_vote(&self, vote: &VoteRequest) -> Result<()>;

    fn results(&self, election: &Id) -> Result<Vec<CandidateResult>>;

    /// The current user's voting history.
    fn my_votes(&self) -> Result<Vec<VoteRecord>>;
}

/// Public faculty and department directories.
pub trait DirectoryApi {
    fn faculties(&self) -> Result<Vec<Faculty>>;

    /// All departments, or only those of `faculty`.
    fn departments(&self, faculty: Option<&Id>) -> Result<Vec<Department>>;
}

/// Administrative management. Every endpoint requires the admin role.
pub trait AdminApi {
    fn dashboard(&self) -> Result<AdminDashboard>;

    /// Elections in one phase, or all elections when `phase` is `None`.
    fn admin_elections(&self, phase: Option<ElectionPhase>) -> Result<Vec<Election>>;

    /// Older spelling of the unfiltered listing, still served by some deployments.
    fn admin_all_elections(&self) -> Result<Vec<Election>>;

    fn create_election(&self, form: &ElectionForm) -> Result<()>;

    fn update_election(&self, id: &Id, form: &ElectionForm) -> Result<()>;

    fn delete_election(&self, id: &Id) -> Result<()>;

    fn create_candidate(&self, form: &CandidateForm) -> Result<()>;

    fn update_candidate(&self, id: &Id, form: &CandidateForm) -> Result<()>;

    fn delete_candidate(&self, id: &Id) -> Result<()>;

    fn users(&self) -> Result<Vec<User>>;

    fn update_user(&self, id: &Id, update: &UserUpdate) -> Result<()>;

    fn delete_user(&self, id: &Id) -> Result<()>;

    fn create_faculty(&self, form: &FacultyForm) -> Result<()>;

    fn update_faculty(&self, id: &Id, form: &FacultyForm) -> Result<()>;

    fn delete_faculty(&self, id: &Id) -> Result<()>;

    fn create_department(&self, form: &DepartmentForm) -> Result<()>;

    fn update_department(&self, id: &Id, form: &DepartmentForm) -> Result<()>;

    fn delete_department(&self, id: &Id) -> Result<()>;
}
