use crate::flow::{Field, FieldKind, Flow, FlowError, FlowSpec, PromptTemplate, Shape};
use crate::llm::CompletionService;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestSimilarIssuesInput {
    pub description: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestSimilarIssuesOutput {
    pub suggestions: Vec<String>,
}

const PROMPT: &str = "You are an AI assistant helping users report issues in their city.

Given the following issue description and location, suggest a list of similar existing issues that might already have been reported. Return a list of issue descriptions only. Return an empty array if no suggestions apply.

Issue Description: {{description}}
Location: {{location}}
";

pub static SUGGEST_SIMILAR_ISSUES: FlowSpec = FlowSpec {
    name: "suggestSimilarIssuesFlow",
    template: PromptTemplate::new("suggestSimilarIssuesPrompt", PROMPT),
    input: Shape::new(
        "SuggestSimilarIssuesInput",
        &[
            Field {
                name: "description",
                description: "The description of the issue being reported.",
                kind: FieldKind::Text { non_empty: true },
            },
            Field {
                name: "location",
                description: "The location of the issue being reported.",
                kind: FieldKind::Text { non_empty: true },
            },
        ],
    ),
    output: Shape::new(
        "SuggestSimilarIssuesOutput",
        &[Field {
            name: "suggestions",
            description: "A list of similar issue descriptions.",
            kind: FieldKind::TextList,
        }],
    ),
};

static FLOW: Flow<SuggestSimilarIssuesInput, SuggestSimilarIssuesOutput> =
    Flow::new(&SUGGEST_SIMILAR_ISSUES);

/// Asks the hosted model for already-reported issues resembling a new report.
pub async fn suggest_similar_issues(
    service: &dyn CompletionService,
    input: &SuggestSimilarIssuesInput,
) -> Result<SuggestSimilarIssuesOutput, FlowError> {
    FLOW.run(service, input).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ScriptedCompletion, ScriptedReply};
    use serde_json::json;

    fn pothole() -> SuggestSimilarIssuesInput {
        SuggestSimilarIssuesInput {
            description: "Large pothole on Main St causing damage".to_string(),
            location: "123 Main St".to_string(),
        }
    }

    #[tokio::test]
    async fn test_suggestions_are_a_list_of_strings() {
        let service = ScriptedCompletion::new([ScriptedReply::Payload(json!({
            "suggestions": ["Pothole near 120 Main St", "Road damage on Main St"]
        }))]);
        let out = suggest_similar_issues(&service, &pothole()).await.unwrap();
        assert_eq!(
            out.suggestions,
            vec!["Pothole near 120 Main St", "Road damage on Main St"]
        );

        let prompt = &service.requests()[0].prompt;
        assert!(prompt.contains("Issue Description: Large pothole on Main St causing damage"));
        assert!(prompt.contains("Location: 123 Main St"));
    }

    #[tokio::test]
    async fn test_empty_suggestions() {
        let service =
            ScriptedCompletion::new([ScriptedReply::Payload(json!({ "suggestions": [] }))]);
        let out = suggest_similar_issues(&service, &pothole()).await.unwrap();
        assert!(out.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_single_string_is_rejected() {
        let service = ScriptedCompletion::new([ScriptedReply::Payload(json!({
            "suggestions": "Pothole near 120 Main St"
        }))]);
        let err = suggest_similar_issues(&service, &pothole()).await.unwrap_err();
        assert!(err.is_output_shape());
    }

    #[tokio::test]
    async fn test_null_suggestions_are_rejected() {
        let service =
            ScriptedCompletion::new([ScriptedReply::Payload(json!({ "suggestions": null }))]);
        let err = suggest_similar_issues(&service, &pothole()).await.unwrap_err();
        assert!(err.is_output_shape());
    }

    #[tokio::test]
    async fn test_blank_location_is_rejected_locally() {
        let service =
            ScriptedCompletion::always(ScriptedReply::Payload(json!({ "suggestions": [] })));
        let input = SuggestSimilarIssuesInput {
            location: " ".to_string(),
            ..pothole()
        };
        let err = suggest_similar_issues(&service, &input).await.unwrap_err();
        match err {
            FlowError::Validation { violations, .. } => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "location");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(service.calls(), 0);
    }
}
