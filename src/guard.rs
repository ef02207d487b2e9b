//! Role-gated navigation.

use std::fmt::{Display, Formatter};

use crate::model::{Id, Role};
use crate::session::SessionState;

/// Every view of the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Elections,
    Vote(Id),
    Results(Option<Id>),
    Profile,
    AdminDashboard,
    AdminElections,
    AdminCandidates,
    AdminUsers,
    AdminSettings,
    NotFound,
}

impl Route {
    /// Parse a path such as `/vote/64f0` or `/results?election=64f0`.
    pub fn parse(path: &str) -> Self {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] | ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["elections"] => Self::Elections,
            ["vote", id] => id.parse().map(Self::Vote).unwrap_or(Self::NotFound),
            ["results"] => Self::Results(
                query
                    .split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .find(|(key, _)| *key == "election")
                    .and_then(|(_, id)| id.parse().ok()),
            ),
            ["profile"] => Self::Profile,
            ["admin", "dashboard"] => Self::AdminDashboard,
            ["admin", "elections"] => Self::AdminElections,
            ["admin", "candidates"] => Self::AdminCandidates,
            ["admin", "users"] => Self::AdminUsers,
            ["admin", "settings"] => Self::AdminSettings,
            _ => Self::NotFound,
        }
    }

    /// The role a user must have to see this view; `None` for public views.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Self::Login | Self::Register | Self::NotFound => None,
            Self::Dashboard
            | Self::Elections
            | Self::Vote(_)
            | Self::Results(_)
            | Self::Profile => Some(Role::Student),
            Self::AdminDashboard
            | Self::AdminElections
            | Self::AdminCandidates
            | Self::AdminUsers
            | Self::AdminSettings => Some(Role::Admin),
        }
    }

    /// Landing view for a role.
    pub fn home(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminDashboard,
            Role::Student => Self::Dashboard,
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Login => write!(f, "/login"),
            Self::Register => write!(f, "/register"),
            Self::Dashboard => write!(f, "/dashboard"),
            Self::Elections => write!(f, "/elections"),
            Self::Vote(id) => write!(f, "/vote/{id}"),
            Self::Results(None) => write!(f, "/results"),
            Self::Results(Some(id)) => write!(f, "/results?election={id}"),
            Self::Profile => write!(f, "/profile"),
            Self::AdminDashboard => write!(f, "/admin/dashboard"),
            Self::AdminElections => write!(f, "/admin/elections"),
            Self::AdminCandidates => write!(f, "/admin/candidates"),
            Self::AdminUsers => write!(f, "/admin/users"),
            Self::AdminSettings => write!(f, "/admin/settings"),
            Self::NotFound => write!(f, "/404"),
        }
    }
}

/// What to do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// The session is still being resolved.
    Loading,
    Render,
    Redirect(Route),
}

/// Decide whether a view requiring `required` may be shown for `state`.
pub fn check(state: &SessionState, required: Option<Role>) -> Guard {
    let Some(required) = required else {
        return Guard::Render;
    };
    match state {
        SessionState::Unresolved => Guard::Loading,
        SessionState::Anonymous => Guard::Redirect(Route::Login),
        SessionState::Authenticated(user) if user.role != required => {
            Guard::Redirect(Route::home(user.role))
        }
        SessionState::Authenticated(_) => Guard::Render,
    }
}
