use serde::Serialize;
use std::fmt;

/// The result of applying one command to the scene.
///
/// Only `Success` implies the scene was mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Success { message: String },
    Rejected { reason: String },
    Informational {
        message: String,
        detail: Option<String>,
    },
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome::Success {
            message: message.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Outcome::Rejected {
            reason: reason.into(),
        }
    }

    pub fn informational(message: impl Into<String>, detail: Option<String>) -> Self {
        Outcome::Informational {
            message: message.into(),
            detail,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// The human-readable message, without detail.
    pub fn message(&self) -> &str {
        match self {
            Outcome::Success { message } => message,
            Outcome::Rejected { reason } => reason,
            Outcome::Informational { message, .. } => message,
        }
    }

    /// The line shown to the user in a status area.
    pub fn status_line(&self) -> String {
        format!("Status: {}", self)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Rejected { .. } => write!(f, "rejected: {}", self.message()),
            Outcome::Informational {
                detail: Some(detail),
                ..
            } => write!(f, "{} ({})", self.message(), detail),
            _ => write!(f, "{}", self.message()),
        }
    }
}
