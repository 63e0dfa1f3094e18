use std::sync::Arc;
use kb_core::{Error, Result};
use crate::Config;

pub mod local;
pub mod openai;

pub use kb_core::Summarizer;
pub use local::LocalSummarizer;
pub use openai::OpenAiSummarizer;

/// Summarizer backends selectable at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarizerKind {
    #[default]
    Local,
    OpenAi,
}

impl std::str::FromStr for SummarizerKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" | "simulated" => Ok(Self::Local),
            "openai" => Ok(Self::OpenAi),
            other => Err(Error::Configuration(format!(
                "unknown summarizer '{}', available: local, openai",
                other
            ))),
        }
    }
}

impl std::fmt::Display for SummarizerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

/// Build the summarizer described by `config`.
///
/// Everything configurable is resolved here, once; request handling never
/// reads the environment.
pub fn create_summarizer(config: &Config) -> Result<Arc<dyn Summarizer>> {
    let model: Arc<dyn Summarizer> = match config.kind {
        SummarizerKind::Local => Arc::new(LocalSummarizer::with_latency(config.simulated_latency)),
        SummarizerKind::OpenAi => {
            let api_key = config.resolved_api_key();
            if api_key.is_none() {
                tracing::warn!(
                    "⚠️ No {} configured, every remote summarization will fail",
                    openai::API_KEY_ENV
                );
            }
            Arc::new(OpenAiSummarizer::from_parts(
                api_key,
                config.model_name.clone(),
                config.base_url.clone(),
                config.request_timeout,
            )?)
        }
    };
    Ok(model)
}
