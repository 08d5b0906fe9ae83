pub mod admin;
pub mod board;
pub mod flow;
pub mod flows;
pub mod llm;
pub mod model;
pub mod report;

pub use flow::{Flow, FlowError, FlowSpec};
pub use flows::{
    SuggestSimilarIssuesInput, SuggestSimilarIssuesOutput, SummarizeIssuesInput,
    SummarizeIssuesOutput, suggest_similar_issues, summarize_issues_for_official,
};
pub use llm::{CompletionRequest, CompletionService, ServiceError};
