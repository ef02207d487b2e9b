use crate::api::AuthApi;
use crate::error::{Error, Result};
use crate::model::{Credentials, ProfileUpdate, Registration, User};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet checked against the server.
    Unresolved,
    Authenticated(User),
    Anonymous,
}

/// The authenticated identity and the operations that change it.
///
/// A session starts [`SessionState::Unresolved`]; [`Session::initialize`]
/// resolves any stored token into a user. Every operation that the server
/// answers with 401 drops the session back to anonymous.
pub struct Session<A> {
    api: A,
    state: SessionState,
}

impl<A: AuthApi> Session<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: SessionState::Unresolved,
        }
    }

    /// Resolve the stored token, if any, into the current user. A token the
    /// server no longer accepts is discarded.
    pub fn initialize(&mut self) -> &SessionState {
        let token = self.api.tokens().load().unwrap_or_else(|err| {
            log::warn!("Could not read stored token: {err}");
            None
        });

        self.state = match token {
            None => SessionState::Anonymous,
            Some(_) => match self.api.me() {
                Ok(user) => {
                    log::info!("Resumed session for {}", user.matric_number);
                    SessionState::Authenticated(user)
                }
                Err(err) => {
                    log::warn!("Auth check failed: {err}");
                    if let Err(err) = self.api.tokens().clear() {
                        log::warn!("Could not clear stored token: {err}");
                    }
                    SessionState::Anonymous
                }
            },
        };
        &self.state
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The signed-in user, if the session is resolved and authenticated.
    pub fn current_user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn login(&mut self, credentials: &Credentials) -> Result<&User> {
        let result = self.api.login(credentials);
        let response = self.observe(result)?;
        self.api.tokens().save(&response.access_token)?;

        let user = match self.api.me() {
            Ok(user) => user,
            Err(err) => {
                log::warn!("Could not resolve the new session: {err}");
                if let Err(err) = self.api.tokens().clear() {
                    log::warn!("Could not clear stored token: {err}");
                }
                self.state = SessionState::Anonymous;
                return Err(err);
            }
        };
        log::info!("Logged in as {}", user.matric_number);
        self.state = SessionState::Authenticated(user);
        Ok(self.authenticated_user())
    }

    /// Create an account. The new user still has to log in.
    pub fn register(&self, registration: &Registration) -> Result<()> {
        registration.validate().map_err(Error::Invalid)?;
        self.api.register(registration)?;
        log::info!("Registered {}", registration.matric_number);
        Ok(())
    }

    pub fn update_profile(&mut self, update: &ProfileUpdate) -> Result<&User> {
        if self.current_user().is_none() {
            return Err(Error::Unauthenticated("Not logged in".to_string()));
        }
        if update.is_empty() {
            return Err(Error::Invalid("Nothing to update".to_string()));
        }
        let result = self.api.update_profile(update);
        let user = self.observe(result)?;
        self.state = SessionState::Authenticated(user);
        Ok(self.authenticated_user())
    }

    /// Forget the token and end the session.
    pub fn logout(&mut self) -> Result<()> {
        self.api.tokens().clear()?;
        self.state = SessionState::Anonymous;
        log::info!("Logged out");
        Ok(())
    }

    /// Pass a result through, ending the session if it was a 401.
    pub fn observe<T>(&mut self, result: Result<T>) -> Result<T> {
        if matches!(&result, Err(err) if err.is_unauthenticated()) {
            self.state = SessionState::Anonymous;
        }
        result
    }

    fn authenticated_user(&self) -> &User {
        match &self.state {
            SessionState::Authenticated(user) => user,
            _ => unreachable!("state was just set to authenticated"),
        }
    }
}
