use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong talking to the voting API.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] figment::Error),
    #[error("Invalid API URL: {0}")]
    Url(String),
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rejected ({status}): {}", describe(.status, .message))]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("Server error ({status}): {}", describe(.status, .message))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },
    #[error("Invalid input: {0}")]
    Invalid(String),
}

/// Error body as sent by the API. Older endpoints use `message`, newer ones `detail`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// The first non-blank of `message` and `detail`.
    fn into_message(self) -> Option<String> {
        let detail = self.detail.map(|detail| match detail {
            serde_json::Value::String(detail) => detail,
            other => other.to_string(),
        });
        self.message
            .into_iter()
            .chain(detail)
            .find(|message| !message.trim().is_empty())
    }
}

impl Error {
    /// Classify a non-success response.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message);
        let or_reason = |message: Option<String>| describe(&status, &message).to_string();

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthenticated(or_reason(message)),
            StatusCode::FORBIDDEN => Self::Forbidden(or_reason(message)),
            StatusCode::NOT_FOUND => Self::NotFound(or_reason(message)),
            s if s.is_client_error() => Self::Rejected { status, message },
            _ => Self::Server { status, message },
        }
    }

    /// HTTP status of the failure, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthenticated(_) => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden(_) => Some(StatusCode::FORBIDDEN),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Rejected { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }

    /// The message the server sent with this failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } | Self::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// A message suitable for showing to the user, with `fallback` used for
    /// failures that carry nothing more specific.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Unauthenticated(_) => "Your session has expired. Please log in again.".to_string(),
            Self::Forbidden(_) => "You are not authorized to perform this action.".to_string(),
            Self::NotFound(message) => format!("Not found: {message}"),
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Invalid(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// The server's message, or the status reason when it sent none.
fn describe<'a>(status: &StatusCode, message: &'a Option<String>) -> &'a str {
    match message {
        Some(message) => message,
        None => status.canonical_reason().unwrap_or("Unknown error"),
    }
}
