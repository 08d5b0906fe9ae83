use crate::llm::service::{CompletionRequest, CompletionService, ServiceError};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base of an OpenAI-compatible API, without the trailing `/chat/completions`.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Chat-completions client asking for `json_schema` structured output.
#[derive(Clone)]
pub struct OpenAiCompletion {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiCompletion {
    pub fn new(config: OpenAiConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn payload(&self, request: &CompletionRequest) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": request.prompt
                }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.output_schema
                }
            }
        })
    }
}

#[async_trait]
impl CompletionService for OpenAiCompletion {
    async fn complete(&self, request: CompletionRequest) -> Result<Option<Value>, ServiceError> {
        tracing::debug!(
            flow = request.flow,
            model = %self.config.model,
            "sending completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&self.payload(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let result: Value = response.json().await?;
        structured_content(&result)
    }
}

/// Pulls the structured payload out of a chat-completions envelope.
fn structured_content(envelope: &Value) -> Result<Option<Value>, ServiceError> {
    let message = envelope
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| ServiceError::Envelope("response has no choices".to_string()))?;

    if let Some(refusal) = message.get("refusal").and_then(Value::as_str) {
        tracing::warn!(refusal, "model refused to answer");
        return Ok(None);
    }

    let Some(content) = message.get("content").and_then(Value::as_str) else {
        return Ok(None);
    };

    match serde_json::from_str(content) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(error = %e, "completion content is not valid JSON");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_content_parses_json_content() {
        let envelope = json!({
            "choices": [{ "message": { "content": "{\"suggestions\":[\"Pothole on 2nd Ave\"]}" } }]
        });
        let value = structured_content(&envelope).unwrap().unwrap();
        assert_eq!(value, json!({ "suggestions": ["Pothole on 2nd Ave"] }));
    }

    #[test]
    fn test_structured_content_without_payload() {
        let refusal = json!({
            "choices": [{ "message": { "content": null, "refusal": "I can't help with that." } }]
        });
        assert!(structured_content(&refusal).unwrap().is_none());

        let prose = json!({ "choices": [{ "message": { "content": "Sure! Here you go." } }] });
        assert!(structured_content(&prose).unwrap().is_none());
    }

    #[test]
    fn test_structured_content_rejects_broken_envelope() {
        let err = structured_content(&json!({ "error": "boom" })).unwrap_err();
        assert!(matches!(err, ServiceError::Envelope(_)));
    }

    #[test]
    fn test_payload_requests_strict_schema() {
        let client = OpenAiCompletion::new(OpenAiConfig::new("sk-test")).unwrap();
        let request = CompletionRequest {
            flow: "summarizeIssuesFlow",
            schema_name: "SummarizeIssuesOutput",
            prompt: "Summarize".to_string(),
            output_schema: json!({ "type": "object" }),
        };
        let payload = client.payload(&request);
        assert_eq!(payload["model"], DEFAULT_MODEL);
        assert_eq!(payload["messages"][0]["content"], "Summarize");
        assert_eq!(payload["response_format"]["json_schema"]["strict"], true);
        assert_eq!(
            payload["response_format"]["json_schema"]["name"],
            "SummarizeIssuesOutput"
        );
        assert_eq!(client.endpoint(), "https://api.openai.com/v1/chat/completions");
    }
}
