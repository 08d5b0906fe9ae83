use crate::llm::ServiceError;
use serde::Serialize;
use std::fmt;

/// A single field that failed shape validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of a single flow invocation.
///
/// Validation failures never reach the network. The other two variants carry
/// whatever the completion service did wrong and are passed to the caller
/// without retries.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{flow}: invalid input ({})", join_violations(.violations))]
    Validation {
        flow: &'static str,
        violations: Vec<FieldViolation>,
    },

    #[error("{flow}: reply does not match the output shape: {reason}")]
    OutputShape { flow: &'static str, reason: String },

    #[error("{flow}: completion service failed: {source}")]
    Service {
        flow: &'static str,
        #[source]
        source: ServiceError,
    },
}

impl FlowError {
    pub fn flow(&self) -> &'static str {
        match self {
            FlowError::Validation { flow, .. }
            | FlowError::OutputShape { flow, .. }
            | FlowError::Service { flow, .. } => flow,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FlowError::Validation { .. })
    }

    pub fn is_output_shape(&self) -> bool {
        matches!(self, FlowError::OutputShape { .. })
    }

    pub fn is_service(&self) -> bool {
        matches!(self, FlowError::Service { .. })
    }
}
