use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use kb_core::{Article, Error, QueryContext, Result, Summary};
use url::Url;
use crate::parsing::extract_ids;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const SYSTEM_PROMPT: &str = "You are an IT help assistant.";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
///
/// The credential and model are resolved once, at construction. A missing
/// credential is not a construction error: it is reported by
/// [`Summarizer::summarize`] before any request goes out.
///
/// [`Summarizer::summarize`]: super::Summarizer::summarize
pub struct OpenAiSummarizer {
    client: Arc<Client>,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl fmt::Debug for OpenAiSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSummarizer")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl OpenAiSummarizer {
    /// Falls back to `OPENAI_API_KEY` when `api_key` is not given.
    pub fn new(api_key: Option<String>, model: Option<String>) -> Result<Self> {
        let api_key = non_empty(api_key).or_else(|| non_empty(std::env::var(API_KEY_ENV).ok()));
        Self::from_parts(api_key, model, None, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build without consulting the environment.
    pub fn from_parts(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Url::parse(&base_url)
            .map_err(|e| Error::Configuration(format!("invalid base url '{}': {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            api_key: non_empty(api_key),
            model: non_empty(model).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, api_key: &str, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
        };

        let response = self.client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Inference(format!("openai api error: {}", status)));
        }

        let response = response.json::<ChatResponse>().await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Inference("no choices returned".to_string()))
    }
}

/// The user message sent to the model.
pub fn build_prompt(query: &str, articles: &[Article]) -> String {
    let mut prompt = format!("User query: {}\n\nKnowledge Base Articles:\n", query);
    for article in articles {
        prompt.push_str(&format!(
            "- ID: {}\nTitle: {}\nContent: {}\n\n",
            article.id, article.title, article.content
        ));
    }
    prompt.push_str(
        "Task: Provide a concise helpful answer to the user's query based ONLY on the KB articles above. \
         Also output the relevant Article IDs as a JSON array.",
    );
    prompt
}

#[async_trait]
impl super::Summarizer for OpenAiSummarizer {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn summarize(&self, ctx: &QueryContext, query: &str, articles: &[Article]) -> Result<Summary> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Configuration(format!("missing {}", API_KEY_ENV)))?;

        let prompt = build_prompt(query, articles);
        tracing::debug!("Requesting {} completion for {} article(s)", self.model, articles.len());

        let answer = ctx.run(self.complete(api_key, prompt)).await?;
        let relevant_ids = extract_ids(&answer);
        Ok(Summary::new(answer, relevant_ids))
    }
}
