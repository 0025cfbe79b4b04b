// SPDX-License-Identifier: MIT

//! Typed error handling for finops-approval
//!
//! `ApprovalError` is what every public operation returns. A failed run
//! (any variant here) is distinct from a rejected run, which completes
//! normally with `approved = false`.

use thiserror::Error;

use crate::approval::workflow::steps::StepId;

/// Top-level error type for finops-approval
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// No record matches the requested project id
    #[error("Project '{project_id}' not found")]
    NotFound { project_id: String },

    /// A step ran without the upstream fields it needs
    #[error("Step '{step}' requires '{field}' but it has not been set")]
    PreconditionViolation { step: StepId, field: &'static str },

    /// Configuration errors (missing or malformed policy, bad config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A record column that cannot be coerced to the expected type
    #[error("Invalid value '{value}' in column '{field}' of project '{project_id}'")]
    InvalidField {
        project_id: String,
        field: &'static str,
        value: String,
    },

    /// Orchestration errors
    #[error("Workflow error: {0}")]
    Workflow(#[from] WorkflowError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Orchestration-specific errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A step tried to write a field that an earlier step already set
    #[error("Field '{field}' is write-once and has already been set")]
    FieldAlreadySet { field: &'static str },

    /// A fan-out task panicked or was cancelled
    #[error("Step task failed to join: {0}")]
    Join(String),

    /// The graph stopped before reaching the terminal step
    #[error("Run stopped with steps still pending: {pending:?}")]
    Incomplete { pending: Vec<StepId> },

    /// The final state is missing an output the response requires
    #[error("Run finished without '{field}'")]
    MissingOutput { field: &'static str },
}

impl ApprovalError {
    /// Create a not found error
    pub fn not_found(project_id: impl Into<String>) -> Self {
        Self::NotFound {
            project_id: project_id.into(),
        }
    }

    /// Create a precondition violation
    pub fn precondition(step: StepId, field: &'static str) -> Self {
        Self::PreconditionViolation { step, field }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid field error
    pub fn invalid_field(
        project_id: impl Into<String>,
        field: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            project_id: project_id.into(),
            field,
            value: value.into(),
        }
    }

    /// Whether this error means the requested record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ApprovalError>;
