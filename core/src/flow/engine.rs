use crate::flow::error::{FieldViolation, FlowError};
use crate::flow::shape::Shape;
use crate::flow::template::PromptTemplate;
use crate::llm::{CompletionRequest, CompletionService};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::instrument;

/// A named prompt plus the shapes of what goes in and what must come out.
#[derive(Debug, Clone, Copy)]
pub struct FlowSpec {
    pub name: &'static str,
    pub template: PromptTemplate,
    pub input: Shape,
    pub output: Shape,
}

impl FlowSpec {
    /// Runs the flow on an untyped input.
    ///
    /// Exactly one completion call is made, and only when `input` matches the
    /// input shape.
    #[instrument(skip_all, fields(flow = self.name))]
    pub async fn execute(
        &self,
        service: &dyn CompletionService,
        input: &Value,
    ) -> Result<Value, FlowError> {
        let prompt = self.render(input)?;

        let request = CompletionRequest {
            flow: self.name,
            schema_name: self.output.name,
            prompt,
            output_schema: self.output.json_schema(),
        };

        let reply = service
            .complete(request)
            .await
            .map_err(|source| FlowError::Service {
                flow: self.name,
                source,
            })?;

        let Some(reply) = reply else {
            return Err(FlowError::OutputShape {
                flow: self.name,
                reason: "service returned no structured payload".to_string(),
            });
        };

        self.output
            .validate(&reply)
            .map_err(|violations| FlowError::OutputShape {
                flow: self.name,
                reason: violations
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            })?;

        tracing::debug!("reply matches output shape");
        Ok(reply)
    }

    /// Validates `input` and renders the prompt without calling the service.
    pub fn render(&self, input: &Value) -> Result<String, FlowError> {
        self.input
            .validate(input)
            .map_err(|violations| FlowError::Validation {
                flow: self.name,
                violations,
            })?;

        // validate() guarantees an object here
        let fields = input.as_object().cloned().unwrap_or_default();

        self.template
            .render(&fields)
            .map_err(|e| FlowError::Validation {
                flow: self.name,
                violations: vec![FieldViolation::new(e.field(), e.to_string())],
            })
    }
}

/// A [`FlowSpec`] bound to concrete request and response types.
pub struct Flow<I, O> {
    spec: &'static FlowSpec,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> Flow<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    pub const fn new(spec: &'static FlowSpec) -> Self {
        Self {
            spec,
            _types: PhantomData,
        }
    }

    pub fn spec(&self) -> &'static FlowSpec {
        self.spec
    }

    pub async fn run(&self, service: &dyn CompletionService, input: &I) -> Result<O, FlowError> {
        let input = serde_json::to_value(input).map_err(|e| FlowError::Validation {
            flow: self.spec.name,
            violations: vec![FieldViolation::new(self.spec.input.name, e.to_string())],
        })?;

        let reply = self.spec.execute(service, &input).await?;

        serde_json::from_value(reply).map_err(|e| FlowError::OutputShape {
            flow: self.spec.name,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::shape::{Field, FieldKind};
    use crate::llm::{ScriptedCompletion, ScriptedReply};
    use serde_json::json;

    static ECHO: FlowSpec = FlowSpec {
        name: "echoFlow",
        template: PromptTemplate::new("echoPrompt", "Say {{word}}"),
        input: Shape::new(
            "EchoInput",
            &[Field {
                name: "word",
                description: "word to say",
                kind: FieldKind::Text { non_empty: true },
            }],
        ),
        output: Shape::new(
            "EchoOutput",
            &[Field {
                name: "said",
                description: "what was said",
                kind: FieldKind::Text { non_empty: false },
            }],
        ),
    };

    #[tokio::test]
    async fn test_execute_sends_rendered_prompt_and_schema() {
        let service = ScriptedCompletion::new([ScriptedReply::Payload(json!({ "said": "hi" }))]);
        let out = ECHO.execute(&service, &json!({ "word": "hi" })).await.unwrap();
        assert_eq!(out, json!({ "said": "hi" }));

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].prompt, "Say hi");
        assert_eq!(requests[0].schema_name, "EchoOutput");
        assert_eq!(requests[0].output_schema["required"], json!(["said"]));
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_service() {
        let service = ScriptedCompletion::always(ScriptedReply::Payload(json!({ "said": "x" })));
        let err = ECHO.execute(&service, &json!({ "word": "" })).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_reply_missing_fields_is_output_shape_error() {
        let service = ScriptedCompletion::new([ScriptedReply::Payload(json!({ "other": 1 }))]);
        let err = ECHO.execute(&service, &json!({ "word": "hi" })).await.unwrap_err();
        assert!(err.is_output_shape());
        assert!(err.to_string().contains("said: is required"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_output_shape_error() {
        let service = ScriptedCompletion::new([ScriptedReply::Empty]);
        let err = ECHO.execute(&service, &json!({ "word": "hi" })).await.unwrap_err();
        assert!(err.is_output_shape());
    }

    #[tokio::test]
    async fn test_service_failure_propagates() {
        let service = ScriptedCompletion::new([ScriptedReply::Fail {
            status: 500,
            body: "upstream".to_string(),
        }]);
        let err = ECHO.execute(&service, &json!({ "word": "hi" })).await.unwrap_err();
        assert!(err.is_service());
        assert_eq!(err.flow(), "echoFlow");
        assert_eq!(service.calls(), 1);
    }
}
