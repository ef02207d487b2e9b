use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Id, Named, Ref};

/// What a user is allowed to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "Student"),
            Self::Admin => write!(f, "Administrator"),
        }
    }
}

/// An authenticated user as returned by `/auth/me` and the admin user listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub matric_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty: Option<Ref<Named>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Ref<Named>>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Login form; sent form-encoded with `grant_type=password`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub matric_number: String,
    pub password: String,
}

impl Credentials {
    pub fn form(&self) -> [(&'static str, &str); 3] {
        [
            ("grant_type", "password"),
            ("username", &self.matric_number),
            ("password", &self.password),
        ]
    }
}

/// Successful login response. Everything beyond the token is informational;
/// the full user is resolved through `/auth/me`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// New-account form, sent as multipart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub matric_number: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub faculty: Id,
    pub department: Id,
    pub profile_image: Option<PathBuf>,
}

impl Registration {
    pub fn validate(&self) -> Result<(), String> {
        if self.password != self.confirm_password {
            return Err("Passwords do not match".to_string());
        }
        for (name, value) in [
            ("First name", &self.first_name),
            ("Last name", &self.last_name),
            ("Matric number", &self.matric_number),
            ("Email", &self.email),
            ("Password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} is required"));
            }
        }
        if self.faculty.is_empty() || self.department.is_empty() {
            return Err("Faculty and department are required".to_string());
        }
        Ok(())
    }

    /// Text fields in wire naming. `confirmPassword` never leaves the client.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("firstName", self.first_name.clone()),
            ("lastName", self.last_name.clone()),
            ("matricNumber", self.matric_number.clone()),
            ("email", self.email.clone()),
            ("password", self.password.clone()),
            ("faculty", self.faculty.to_string()),
            ("department", self.department.to_string()),
        ]
    }
}

/// Partial profile update, sent as multipart. Only present fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub faculty: Option<Id>,
    pub department: Option<Id>,
    pub profile_image: Option<PathBuf>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        [
            ("firstName", self.first_name.clone()),
            ("lastName", self.last_name.clone()),
            ("email", self.email.clone()),
            ("faculty", self.faculty.as_ref().map(Id::to_string)),
            ("department", self.department.as_ref().map(Id::to_string)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect()
    }
}

/// Admin edit of another user's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub matric_number: String,
    pub faculty: Option<Id>,
    pub department: Option<Id>,
    pub role: Role,
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            matric_number: user.matric_number.clone(),
            faculty: user.faculty.as_ref().map(|f| f.id().clone()),
            department: user.department.as_ref().map(|d| d.id().clone()),
            role: user.role,
        }
    }
}

#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    impl User {
        pub fn student() -> Self {
            Self {
                id: Id::from("u1"),
                first_name: "Ada".to_string(),
                last_name: "Obi".to_string(),
                matric_number: "CSC/2021/001".to_string(),
                email: "ada@example.edu".to_string(),
                faculty: Some(Ref::Id(Id::from("f1"))),
                department: Some(Ref::Id(Id::from("d1"))),
                role: Role::Student,
                profile_image_url: None,
            }
        }

        pub fn admin() -> Self {
            Self {
                id: Id::from("u0"),
                role: Role::Admin,
                ..Self::student()
            }
        }
    }

    impl Registration {
        pub fn example() -> Self {
            Self {
                first_name: "Ada".to_string(),
                last_name: "Obi".to_string(),
                matric_number: "CSC/2021/001".to_string(),
                email: "ada@example.edu".to_string(),
                password: "hunter22".to_string(),
                confirm_password: "hunter22".to_string(),
                faculty: Id::from("f1"),
                department: Id::from("d1"),
                profile_image: None,
            }
        }
    }
}
