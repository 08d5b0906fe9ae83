use std::sync::Arc;
use std::time::Duration;

use civic_core::llm::{CompletionService, OpenAiCompletion, OpenAiConfig};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
pub struct HttpOpts {
    /// Address/port for the HTTP listener
    #[arg(long, env = "CIVIC_HOST", default_value = "0.0.0.0:3030")]
    pub host: String,

    #[arg(
        long,
        value_delimiter = ';',
        default_value = "http://localhost:3000;http://127.0.0.1:3000;http://localhost:9002;http://127.0.0.1:9002",
        env = "CIVIC_CORS_ORIGINS"
    )]
    pub origins: Vec<String>,
}

#[derive(Clone, Debug, Parser)]
pub struct AiOpts {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// OpenAI-compatible API base URL
    #[arg(
        long,
        default_value = civic_core::llm::openai::DEFAULT_BASE_URL,
        env = "CIVIC_OPENAI_BASE_URL"
    )]
    pub openai_base_url: String,

    #[arg(
        long,
        default_value = civic_core::llm::openai::DEFAULT_MODEL,
        env = "CIVIC_OPENAI_MODEL"
    )]
    pub openai_model: String,

    /// Request timeout for the completion service, in seconds
    #[arg(long, default_value = "30", env = "CIVIC_OPENAI_TIMEOUT_SECS")]
    pub openai_timeout_secs: u64,
}

impl AiOpts {
    pub fn completion_service(&self) -> anyhow::Result<Arc<dyn CompletionService>> {
        let config = OpenAiConfig {
            api_key: self.openai_api_key.clone(),
            base_url: self.openai_base_url.clone(),
            model: self.openai_model.clone(),
            timeout: Duration::from_secs(self.openai_timeout_secs),
        };
        tracing::info!(
            model = %config.model,
            base_url = %config.base_url,
            "completion service configured"
        );
        Ok(Arc::new(OpenAiCompletion::new(config)?))
    }
}

#[derive(Clone, Debug, Parser)]
pub struct ReportOpts {
    /// Quiet period before a similar-issue lookup fires, in milliseconds
    #[arg(long, default_value = "1000", env = "CIVIC_SUGGEST_QUIET_MS")]
    pub suggest_quiet_ms: u64,
}

impl ReportOpts {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.suggest_quiet_ms)
    }
}
