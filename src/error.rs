//! Error type shared by the repository, planner and command layers.
//!
//! Placement failures are plain values produced by the engine
//! ([`Infeasible`]); they only become a [`PlannerError`] once a caller decides
//! to surface them.

use thiserror::Error;

use crate::placement::Infeasible;

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot place task: {0}")]
    Infeasible(#[from] Infeasible),

    #[error("task {id} not found")]
    TaskNotFound { id: u64 },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl PlannerError {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code used by the CLI.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Infeasible(_) => 3,
            Self::TaskNotFound { .. } | Self::InvalidArgument { .. } => 2,
            Self::Io(_) | Self::Json(_) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_message_is_wrapped() {
        let error = PlannerError::from(Infeasible::NoFreeSlot);
        assert_eq!(error.exit_code(), 3);
        assert!(error.to_string().starts_with("cannot place task:"));
    }

    #[test]
    fn test_invalid_constructor() {
        let error = PlannerError::invalid("bad day");
        assert_eq!(error.to_string(), "invalid argument: bad day");
        assert_eq!(error.exit_code(), 2);
    }
}
