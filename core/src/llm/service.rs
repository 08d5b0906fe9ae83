use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// One structured-output request to the hosted model.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Name of the flow issuing the call, used for logging.
    pub flow: &'static str,
    /// Identifier of the output schema (`[a-zA-Z0-9_-]+`).
    pub schema_name: &'static str,
    pub prompt: String,
    pub output_schema: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("completion service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed completion envelope: {0}")]
    Envelope(String),
}

/// Hosted text-generation service that decodes replies into a given schema.
///
/// `Ok(None)` means the service answered but produced no structured payload
/// (a refusal, empty content or unparseable JSON).
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<Value>, ServiceError>;
}
