use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use civic_core::admin::SummaryError;
use civic_core::board::BoardError;
use civic_core::flow::{FieldViolation, FlowError};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
        fields: Vec<FieldViolation>,
    },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Upstream(String),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Error::InvalidInput { fields, .. } if !fields.is_empty() => {
                json!({ "error": self.to_string(), "fields": fields })
            }
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

impl From<FlowError> for Error {
    fn from(e: FlowError) -> Self {
        match e {
            FlowError::Validation { flow, violations } => Error::InvalidInput {
                message: flow.to_string(),
                fields: violations,
            },
            other => {
                tracing::error!(error = %other, "flow failed");
                Error::Upstream(other.to_string())
            }
        }
    }
}

impl From<BoardError> for Error {
    fn from(e: BoardError) -> Self {
        match e {
            BoardError::InvalidReport(errors) => {
                let fields = errors
                    .field_errors()
                    .into_iter()
                    .flat_map(|(field, errs)| {
                        errs.iter().map(move |err| {
                            let reason = err
                                .message
                                .as_ref()
                                .map(ToString::to_string)
                                .unwrap_or_else(|| err.code.to_string());
                            FieldViolation::new(field.to_string(), reason)
                        })
                    })
                    .collect();
                Error::InvalidInput {
                    message: "report".to_string(),
                    fields,
                }
            }
            BoardError::InvalidVote(_) => Error::invalid(e.to_string()),
            BoardError::IssueNotFound(_)
            | BoardError::UserNotFound(_)
            | BoardError::NotificationNotFound(_) => Error::NotFound(e.to_string()),
        }
    }
}

impl From<SummaryError> for Error {
    fn from(e: SummaryError) -> Self {
        match e {
            SummaryError::NoIssuesSelected => {
                Error::invalid("Please select issues to include in the summary.")
            }
            SummaryError::AlreadyRunning => Error::Conflict(e.to_string()),
            SummaryError::Board(e) => e.into(),
            SummaryError::Flow(e) => e.into(),
        }
    }
}
