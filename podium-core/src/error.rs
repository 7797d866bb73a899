//! Error types for boundary calls and user actions
//!
//! Boundary failures are classified once, at the edge, into transport,
//! structured and unstructured errors. User actions wrap them with the
//! message an operator sees.

use podium_common::{ErrorBody, VmAction};

/// Failure of a single call to the remote API
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Network unreachable, connection reset, timeout reported by the transport
    #[error("{0}")]
    Transport(String),

    /// Non-2xx with a JSON `{error, details}` body, or a 2xx body of the wrong shape
    #[error("{}", structured_message(.error, .details))]
    Structured {
        status: u16,
        error: String,
        details: Option<String>,
    },

    /// Non-2xx with any other body, surfaced as raw text
    #[error("{}", unstructured_message(.status, .body))]
    Unstructured { status: u16, body: String },
}

fn structured_message(error: &str, details: &Option<String>) -> String {
    match details {
        Some(details) => format!("{} ({})", error, details),
        None => error.to_string(),
    }
}

fn unstructured_message(status: &u16, body: &str) -> String {
    if body.trim().is_empty() {
        format!("HTTP error! status: {}", status)
    } else {
        body.to_string()
    }
}

impl ApiError {
    /// Response decoded on a 2xx status but did not match the expected schema
    pub fn invalid_response(status: u16, reason: impl std::fmt::Display) -> Self {
        ApiError::Structured {
            status,
            error: "invalid response".to_string(),
            details: Some(reason.to_string()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Structured { status, .. } | ApiError::Unstructured { status, .. } => {
                Some(*status)
            }
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Classify a non-2xx response body
pub fn classify_failure(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ApiError::Structured {
            status,
            error: parsed.error,
            details: parsed.details,
        },
        Err(_) => ApiError::Unstructured {
            status,
            body: body.to_string(),
        },
    }
}

/// Failure of an operator action, rendered as the notification text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Template catalog has not loaded yet, cannot deploy '{0}'")]
    CatalogUnavailable(String),

    #[error("Template '{0}' is not in the catalog")]
    UnknownTemplate(String),

    #[error("Pod '{0}' is not deployed")]
    UnknownPod(String),

    #[error("Please select one or more VMs to {0}.")]
    EmptySelection(VmAction),

    #[error("Failed to deploy template: {0}")]
    Deploy(ApiError),

    #[error("Failed to delete pod: {0}")]
    Delete(ApiError),
}

/// Login failures, one message per outcome the login screen distinguishes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Username and password are required")]
    MissingCredentials,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Something went wrong. Please try again.")]
    Rejected(u16),

    #[error("Server error. Please try again later.")]
    Unreachable(String),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Transport(msg) => LoginError::Unreachable(msg),
            other => match other.status() {
                Some(401) => LoginError::InvalidCredentials,
                Some(status) => LoginError::Rejected(status),
                None => LoginError::Unreachable(other.to_string()),
            },
        }
    }
}
