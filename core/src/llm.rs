pub mod openai;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;
pub mod service;

pub use openai::{OpenAiCompletion, OpenAiConfig};
#[cfg(any(test, feature = "testing"))]
pub use scripted::{ScriptedCompletion, ScriptedReply};
pub use service::{CompletionRequest, CompletionService, ServiceError};
