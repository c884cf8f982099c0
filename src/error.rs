use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("backend address missing from remote config")]
    MissingBackendUrl,
    #[error("backend address {0:?} is not a valid URL")]
    InvalidBackendUrl(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request rejected with status {status}{}", suffix(.detail))]
    Rejected { status: u16, detail: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

impl ApiError {
    /// Builds a rejection from a non-2xx status and whatever body came with it.
    pub fn rejected(status: u16, body: &str) -> Self {
        ApiError::Rejected {
            status,
            detail: detail_from_body(body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// The backend refused a social signup because the account is already registered.
    pub fn is_already_exists(&self) -> bool {
        self.detail().map_or(false, |d| d.contains("already exists"))
    }

    /// The backend refused a social login because no account is linked yet.
    pub fn is_not_registered(&self) -> bool {
        self.detail() == Some("not_registered")
    }

    /// Message for the user: the backend's own detail when it sent one.
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_owned()
    }
}

fn suffix(detail: &Option<String>) -> String {
    detail.as_ref().map(|d| format!(": {}", d)).unwrap_or_default()
}

fn login_failed(e: &ApiError) -> String {
    e.user_message("Login failed")
}

// Backend error bodies look like {"detail": "..."}, {"detail": ["..."]} or {"error": "..."}
fn detail_from_body(body: &str) -> Option<String> {
    let body: Value = serde_json::from_str(body).ok()?;
    let first_string = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(|i| i.as_str()).map(str::to_owned),
        _ => None,
    };
    body.get("detail")
        .and_then(first_string)
        .or_else(|| body.get("error").and_then(first_string))
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("{0}")]
    Invalid(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{}", login_failed(.0))]
    Api(#[from] ApiError),
    #[error("could not store session: {0:#}")]
    Session(anyhow::Error),
}
