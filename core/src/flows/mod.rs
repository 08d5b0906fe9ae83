mod suggest_similar;
mod summarize;

pub use suggest_similar::{
    SUGGEST_SIMILAR_ISSUES, SuggestSimilarIssuesInput, SuggestSimilarIssuesOutput,
    suggest_similar_issues,
};
pub use summarize::{
    SUMMARIZE_ISSUES, SummarizeIssuesInput, SummarizeIssuesOutput, summarize_issues_for_official,
};
