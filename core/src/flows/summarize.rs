use crate::flow::{Field, FieldKind, Flow, FlowError, FlowSpec, PromptTemplate, Shape};
use crate::llm::CompletionService;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeIssuesInput {
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummarizeIssuesOutput {
    pub summary: String,
}

const PROMPT: &str = "You are an AI assistant for a city administrator. Your task is to generate a concise, professional summary of outstanding civic issues to be forwarded to a government department for action.

Format the summary clearly. Start with a brief opening statement, then list the key issues, and end with a call to action.

Here are the issue titles to summarize:
{{#each issues}}- {{this}}{{/each}}
";

pub static SUMMARIZE_ISSUES: FlowSpec = FlowSpec {
    name: "summarizeIssuesFlow",
    template: PromptTemplate::new("summarizeIssuesPrompt", PROMPT),
    input: Shape::new(
        "SummarizeIssuesInput",
        &[Field {
            name: "issues",
            description: "A list of issue titles to be summarized.",
            kind: FieldKind::TextList,
        }],
    ),
    output: Shape::new(
        "SummarizeIssuesOutput",
        &[Field {
            name: "summary",
            description: "A concise summary of the issues, formatted for an official communication.",
            kind: FieldKind::Text { non_empty: false },
        }],
    ),
};

static FLOW: Flow<SummarizeIssuesInput, SummarizeIssuesOutput> = Flow::new(&SUMMARIZE_ISSUES);

/// Produces a summary of the given issue titles addressed to an authority.
///
/// An empty list is a valid input here. Callers that require a selection
/// (see [`SummaryTrigger`](crate::admin::SummaryTrigger)) enforce it first.
pub async fn summarize_issues_for_official(
    service: &dyn CompletionService,
    input: &SummarizeIssuesInput,
) -> Result<SummarizeIssuesOutput, FlowError> {
    FLOW.run(service, input).await
}
