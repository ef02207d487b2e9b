//! An in-memory stand-in for the voting API that records every call.

use std::cell::RefCell;
use std::collections::VecDeque;

use reqwest::StatusCode;

use crate::error::{Error, Result};
use crate::model::{
    AdminDashboard, Candidate, CandidateForm, CandidateResult, Credentials, Department,
    DepartmentForm, Election, ElectionForm, ElectionPhase, Faculty, FacultyForm, Id,
    LoginResponse, ProfileUpdate, Registration, User, UserUpdate, VoteEligibility, VoteRecord,
    VoteRequest,
};
use crate::token::{MemoryTokenStore, TokenStore};

use super::{AdminApi, AuthApi, DirectoryApi, ElectionApi};

/// A canned reply: a value, or the status and body the server would send.
pub type Reply<T> = std::result::Result<T, (StatusCode, String)>;

pub fn failure<T>(status: StatusCode, message: &str) -> Reply<T> {
    Err((status, format!(r#"{{"message": "{message}"}}"#)))
}

pub struct FakeApi {
    pub tokens: MemoryTokenStore,
    pub calls: RefCell<Vec<String>>,
    pub login: RefCell<Reply<LoginResponse>>,
    pub me: RefCell<Reply<User>>,
    pub elections: RefCell<Reply<Vec<Election>>>,
    pub election: RefCell<Reply<Election>>,
    pub candidates: RefCell<Reply<Vec<Candidate>>>,
    pub eligibility: RefCell<Reply<VoteEligibility>>,
    /// Replies to successive vote submissions; success once exhausted.
    pub vote_replies: RefCell<VecDeque<Reply<()>>>,
    pub votes_cast: RefCell<Vec<VoteRequest>>,
    pub results: RefCell<Reply<Vec<CandidateResult>>>,
    pub history: RefCell<Reply<Vec<VoteRecord>>>,
    pub dashboard: RefCell<Reply<AdminDashboard>>,
    pub admin_elections: RefCell<Reply<Vec<Election>>>,
    pub admin_all_elections: RefCell<Reply<Vec<Election>>>,
    pub users: RefCell<Reply<Vec<User>>>,
    pub faculties: RefCell<Reply<Vec<Faculty>>>,
    pub departments: RefCell<Reply<Vec<Department>>>,
    /// Reply to every create/update/delete.
    pub mutation: RefCell<Reply<()>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            tokens: MemoryTokenStore::default(),
            calls: RefCell::new(Vec::new()),
            login: RefCell::new(failure(StatusCode::UNAUTHORIZED, "Invalid credentials")),
            me: RefCell::new(failure(StatusCode::UNAUTHORIZED, "Not authenticated")),
            elections: RefCell::new(Ok(Vec::new())),
            election: RefCell::new(Ok(Election::example())),
            candidates: RefCell::new(Ok(Vec::new())),
            eligibility: RefCell::new(Ok(VoteEligibility::default())),
            vote_replies: RefCell::new(VecDeque::new()),
            votes_cast: RefCell::new(Vec::new()),
            results: RefCell::new(Ok(Vec::new())),
            history: RefCell::new(Ok(Vec::new())),
            dashboard: RefCell::new(Ok(AdminDashboard::default())),
            admin_elections: RefCell::new(Ok(Vec::new())),
            admin_all_elections: RefCell::new(Ok(Vec::new())),
            users: RefCell::new(Ok(Vec::new())),
            faculties: RefCell::new(Ok(Vec::new())),
            departments: RefCell::new(Ok(Vec::new())),
            mutation: RefCell::new(Ok(())),
        }
    }
}

impl FakeApi {
    /// An API that will hand out a ballot with the given positions and candidates.
    pub fn with_ballot(eligibility: VoteEligibility, candidates: Vec<Candidate>) -> Self {
        let api = Self::default();
        *api.eligibility.borrow_mut() = Ok(eligibility);
        *api.candidates.borrow_mut() = Ok(candidates);
        api
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    /// Resolve a canned reply, forgetting the token on 401 as the real transport does.
    fn reply<T: Clone>(&self, call: impl Into<String>, reply: &RefCell<Reply<T>>) -> Result<T> {
        self.record(call);
        self.resolve(reply.borrow().clone())
    }

    fn resolve<T>(&self, reply: Reply<T>) -> Result<T> {
        reply.map_err(|(status, body)| {
            let err = Error::from_response(status, &body);
            if err.is_unauthenticated() {
                self.tokens.clear().unwrap();
            }
            err
        })
    }
}

impl AuthApi for FakeApi {
    fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        self.reply(format!("POST auth/login {}", credentials.matric_number), &self.login)
    }

    fn register(&self, registration: &Registration) -> Result<()> {
        self.reply(
            format!("POST auth/register {}", registration.matric_number),
            &self.mutation,
        )
    }

    fn me(&self) -> Result<User> {
        self.reply("GET auth/me", &self.me)
    }

    fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let mut user = self.reply("PUT users/profile", &self.me)?;
        if let Some(first_name) = &update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        Ok(user)
    }

    fn tokens(&self) -> &dyn TokenStore {
        &self.tokens
    }
}

impl ElectionApi for FakeApi {
    fn elections(&self, phase: ElectionPhase) -> Result<Vec<Election>> {
        self.reply(format!("GET elections/{}", phase.path_segment()), &self.elections)
    }

    fn all_elections(&self) -> Result<Vec<Election>> {
        self.reply("GET elections", &self.elections)
    }

    fn election(&self, id: &Id) -> Result<Election> {
        self.reply(format!("GET elections/{id}"), &self.election)
    }

    fn candidates(&self, election: &Id) -> Result<Vec<Candidate>> {
        self.reply(format!("GET candidates/election/{election}"), &self.candidates)
    }

    fn eligibility(&self, election: &Id) -> Result<VoteEligibility> {
        self.reply(format!("GET votes/check/{election}"), &self.eligibility)
    }

    fn cast_vote(&self, vote: &VoteRequest) -> Result<()> {
        self.record(format!("POST votes {}", vote.candidate_id));
        let reply = self.vote_replies.borrow_mut().pop_front().unwrap_or(Ok(()));
        self.resolve(reply)?;
        self.votes_cast.borrow_mut().push(vote.clone());
        Ok(())
    }

    fn results(&self, election: &Id) -> Result<Vec<CandidateResult>> {
        self.reply(format!("GET elections/{election}/results"), &self.results)
    }

    fn my_votes(&self) -> Result<Vec<VoteRecord>> {
        self.reply("GET user/votes", &self.history)
    }
}

impl DirectoryApi for FakeApi {
    fn faculties(&self) -> Result<Vec<Faculty>> {
        self.reply("GET faculties", &self.faculties)
    }

    fn departments(&self, faculty: Option<&Id>) -> Result<Vec<Department>> {
        let call = match faculty {
            Some(faculty) => format!("GET departments?faculty={faculty}"),
            None => "GET departments".to_string(),
        };
        self.reply(call, &self.departments)
    }
}

impl AdminApi for FakeApi {
    fn dashboard(&self) -> Result<AdminDashboard> {
        self.reply("GET admin/dashboard", &self.dashboard)
    }

    fn admin_elections(&self, phase: Option<ElectionPhase>) -> Result<Vec<Election>> {
        let call = match phase {
            Some(phase) => format!("GET admin/elections/{}", phase.path_segment()),
            None => "GET admin/elections".to_string(),
        };
        self.reply(call, &self.admin_elections)
    }

    fn admin_all_elections(&self) -> Result<Vec<Election>> {
        self.reply("GET admin/all-elections", &self.admin_all_elections)
    }

    fn create_election(&self, form: &ElectionForm) -> Result<()> {
        self.reply(format!("POST admin/elections {}", form.title), &self.mutation)
    }

    fn update_election(&self, id: &Id, _form: &ElectionForm) -> Result<()> {
        self.reply(format!("PUT admin/elections/{id}"), &self.mutation)
    }

    fn delete_election(&self, id: &Id) -> Result<()> {
        self.reply(format!("DELETE admin/elections/{id}"), &self.mutation)
    }

    fn create_candidate(&self, form: &CandidateForm) -> Result<()> {
        self.reply(format!("POST admin/candidates {}", form.position), &self.mutation)
    }

    fn update_candidate(&self, id: &Id, _form: &CandidateForm) -> Result<()> {
        self.reply(format!("PUT admin/candidates/{id}"), &self.mutation)
    }

    fn delete_candidate(&self, id: &Id) -> Result<()> {
        self.reply(format!("DELETE admin/candidates/{id}"), &self.mutation)
    }

    fn users(&self) -> Result<Vec<User>> {
        self.reply("GET admin/users", &self.users)
    }

    fn update_user(&self, id: &Id, _update: &UserUpdate) -> Result<()> {
        self.reply(format!("PUT admin/users/{id}"), &self.mutation)
    }

    fn delete_user(&self, id: &Id) -> Result<()> {
        self.reply(format!("DELETE admin/users/{id}"), &self.mutation)
    }

    fn create_faculty(&self, form: &FacultyForm) -> Result<()> {
        self.reply(format!("POST admin/faculties {}", form.name), &self.mutation)
    }

    fn update_faculty(&self, id: &Id, _form: &FacultyForm) -> Result<()> {
        self.reply(format!("PUT admin/faculties/{id}"), &self.mutation)
    }

    fn delete_faculty(&self, id: &Id) -> Result<()> {
        self.reply(format!("DELETE admin/faculties/{id}"), &self.mutation)
    }

    fn create_department(&self, form: &DepartmentForm) -> Result<()> {
        self.reply(format!("POST admin/departments {}", form.name), &self.mutation)
    }

    fn update_department(&self, id: &Id, _form: &DepartmentForm) -> Result<()> {
        self.reply(format!("PUT admin/departments/{id}"), &self.mutation)
    }

    fn delete_department(&self, id: &Id) -> Result<()> {
        self.reply(format!("DELETE admin/departments/{id}"), &self.mutation)
    }
}
