use std::fmt;
use std::time::Duration;

pub mod models;
pub mod parsing;

pub use models::{create_summarizer, SummarizerKind};

/// Everything needed to build a summarizer, resolved before serving starts.
#[derive(Clone)]
pub struct Config {
    pub kind: SummarizerKind,
    /// Explicit credential; `OPENAI_API_KEY` is used when absent
    pub api_key: Option<String>,
    pub model_name: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout: Duration,
    pub simulated_latency: Duration,
}

impl Config {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(models::openai::API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model_name", &self.model_name)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("simulated_latency", &self.simulated_latency)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kind: SummarizerKind::default(),
            api_key: None,
            model_name: None,
            base_url: None,
            request_timeout: Duration::from_secs(15),
            simulated_latency: Duration::from_millis(20),
        }
    }
}

pub mod prelude {
    pub use super::models::{create_summarizer, LocalSummarizer, OpenAiSummarizer, SummarizerKind};
    pub use super::Config;
    pub use kb_core::{Article, Error, QueryContext, Result, Summarizer, Summary};
}
