use std::fmt;
use std::time::Duration;
use kb_core::{Article, QueryContext, Result, Summary};
use super::Summarizer;

/// Longest answer the local summarizer produces, marker included.
pub const MAX_ANSWER_CHARS: usize = 700;
const TRUNCATION_MARKER: &str = "...";
const DEFAULT_LATENCY: Duration = Duration::from_millis(20);

/// Offline summarizer that stitches together each article's title and
/// opening sentence. Deterministic apart from a small simulated latency.
pub struct LocalSummarizer {
    latency: Duration,
}

impl fmt::Debug for LocalSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSummarizer")
            .field("latency", &self.latency)
            .finish()
    }
}

impl LocalSummarizer {
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for LocalSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Trimmed text up to and including the first `.`; `!` and then `?` are only
/// used as terminators when the text has no `.` at all.
pub fn first_sentence(content: &str) -> &str {
    let trimmed = content.trim();
    match ['.', '!', '?'].iter().find_map(|&terminator| trimmed.find(terminator)) {
        Some(idx) => trimmed[..=idx].trim(),
        None => trimmed,
    }
}

fn truncate_answer(answer: String) -> String {
    if answer.chars().count() <= MAX_ANSWER_CHARS {
        return answer;
    }
    let keep = MAX_ANSWER_CHARS - TRUNCATION_MARKER.len();
    let mut truncated: String = answer.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

fn compose(query: &str, articles: &[Article]) -> Summary {
    if articles.is_empty() {
        return Summary::new(
            format!(
                "I couldn't find any KB articles relevant to \"{}\". Try rephrasing or adding details.",
                query
            ),
            Vec::new(),
        );
    }

    let snippets: Vec<String> = articles
        .iter()
        .map(|article| match first_sentence(&article.content) {
            "" => article.title.clone(),
            sentence => format!("{}: {}", article.title, sentence),
        })
        .collect();

    let answer = format!(
        "Based on {} article(s): {}",
        articles.len(),
        snippets.join(" | ")
    );

    Summary::new(
        truncate_answer(answer),
        articles.iter().map(|a| a.id.clone()).collect(),
    )
}

#[async_trait::async_trait]
impl Summarizer for LocalSummarizer {
    fn name(&self) -> &str {
        "Local"
    }

    async fn summarize(&self, ctx: &QueryContext, query: &str, articles: &[Article]) -> Result<Summary> {
        let latency = self.latency;
        ctx.run(async move {
            tokio::time::sleep(latency).await;
            Ok(())
        })
        .await?;

        let summary = compose(query, articles);
        tracing::debug!("Local summary built from {} article(s)", articles.len());
        Ok(summary)
    }
}
