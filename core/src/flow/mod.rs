//! Request → hosted-model → response pipelines.
//!
//! A [`FlowSpec`] ties together an input [`Shape`], a [`PromptTemplate`] and an
//! output [`Shape`]. Executing it validates the input, renders the prompt, asks
//! the [`CompletionService`](crate::llm::CompletionService) for a reply
//! constrained to the output shape and validates that reply before handing it
//! back.

pub mod engine;
pub mod error;
pub mod shape;
pub mod template;

pub use engine::{Flow, FlowSpec};
pub use error::{FieldViolation, FlowError};
pub use shape::{Field, FieldKind, Shape};
pub use template::{PromptTemplate, TemplateError};
