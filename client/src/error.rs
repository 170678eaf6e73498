use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::ErrorBody;

pub type Result<T> = std::result::Result<T, ClientError>;

/// The two controls that carry a busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Upload,
    Query,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Upload => f.write_str("upload"),
            Action::Query => f.write_str("query"),
        }
    }
}

/// Problems detected locally, before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a file first")]
    NoFileSelected,

    #[error("Please upload a document first")]
    DocumentRequired,

    #[error("Please enter a question")]
    BlankQuestion,

    #[error("Please wait, the {0} is still in progress")]
    Busy(Action),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connection failures, DNS resolution, broken bodies.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx status, with whatever body the backend sent.
    #[error("HTTP error! status: {status}, body: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {source}; body: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("{0}")]
    UnexpectedResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's `detail` message for a non-2xx response, when present.
    pub fn detail(&self) -> Option<String> {
        match self {
            ClientError::Status { body, .. } => ErrorBody::detail_of(body),
            _ => None,
        }
    }

    /// Message shown to the operator for a failed action.
    ///
    /// Validation errors read as instructions and are shown as-is; everything
    /// else is prefixed with the action that failed.
    pub fn user_message(&self, action: Action) -> String {
        if self.is_validation() {
            return self.to_string();
        }
        match action {
            Action::Upload => format!("Upload failed: {}", self),
            Action::Query => format!("Query failed: {}", self),
        }
    }
}
