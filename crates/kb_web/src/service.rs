use std::sync::Arc;
use std::time::Duration;

use kb_core::{Error, QueryContext, Result, SearchRecord, SearchStore, Summarizer, Summary};
use kb_search::{Corpus, Ranker};
use tracing::{debug, error, info, warn};

/// Articles handed to the summarizer per query
pub const DEFAULT_TOP_N: usize = 3;
/// Upper bound on a single summarization
pub const DEFAULT_SUMMARY_TIMEOUT: Duration = Duration::from_secs(3);

/// Answers one query: rank, summarize under a deadline, then record.
///
/// Holds no per-query state, so one instance serves every request task.
pub struct SearchService {
    ranker: Ranker,
    summarizer: Arc<dyn Summarizer>,
    store: Arc<dyn SearchStore>,
    top_n: usize,
    timeout: Duration,
}

impl std::fmt::Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("articles", &self.ranker.corpus().len())
            .field("summarizer", &self.summarizer)
            .field("top_n", &self.top_n)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SearchService {
    pub fn new(corpus: Arc<Corpus>, summarizer: Arc<dyn Summarizer>, store: Arc<dyn SearchStore>) -> Self {
        Self {
            ranker: Ranker::new(corpus),
            summarizer,
            store,
            top_n: DEFAULT_TOP_N,
            timeout: DEFAULT_SUMMARY_TIMEOUT,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        self.ranker.corpus()
    }

    pub fn summarizer_name(&self) -> &str {
        self.summarizer.name()
    }

    pub async fn search(&self, query: &str) -> Result<Summary> {
        self.search_with_context(QueryContext::background(), query).await
    }

    /// Like [`SearchService::search`], but also stops when `ctx` does.
    ///
    /// The service's own timeout still applies on top of any deadline `ctx`
    /// already carries.
    pub async fn search_with_context(&self, ctx: QueryContext, query: &str) -> Result<Summary> {
        if query.is_empty() {
            return Err(Error::InvalidInput("query cannot be empty".to_string()));
        }

        let articles = self.ranker.rank(query, self.top_n);
        debug!("Ranked {} candidate article(s) for {:?}", articles.len(), query);

        let ctx = ctx.timeout(self.timeout);
        let summary = match self.summarizer.summarize(&ctx, query, &articles).await {
            Ok(summary) => summary,
            Err(e) => {
                error!("{} summarize error: {}", self.summarizer.name(), e);
                return Err(e);
            }
        };

        // History is a side effect; losing a record never fails the query
        match self.store.save(query, &summary.answer, &summary.relevant_ids) {
            Ok(record) => info!("🗂️ Recorded search {}", record.id),
            Err(e) => warn!("⚠️ Failed to record search: {}", e),
        }

        Ok(summary)
    }

    pub fn history(&self) -> Result<Vec<SearchRecord>> {
        self.store.list()
    }

    pub fn clear_history(&self) -> Result<()> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kb_core::Article;
    use kb_inference::models::LocalSummarizer;
    use kb_storage::InMemorySearchStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn corpus() -> Arc<Corpus> {
        Arc::new(
            Corpus::new(vec![
                Article::new(
                    "pw",
                    "How to reset your password",
                    "To reset your password go to account settings -> reset password. If you don't get an email check spam.",
                ),
                Article::new(
                    "net",
                    "Troubleshooting network connectivity",
                    "Check that cable is plugged in, ensure DHCP is enabled.",
                ),
            ])
            .unwrap(),
        )
    }

    /// Counts calls so tests can prove a summarizer was never reached
    #[derive(Debug, Default)]
    struct CountingSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Summarizer for CountingSummarizer {
        fn name(&self) -> &str {
            "Counting"
        }

        async fn summarize(&self, ctx: &QueryContext, _query: &str, articles: &[Article]) -> Result<Summary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            ctx.run(async { Ok(()) }).await?;
            Ok(Summary::new("counted", articles.iter().map(|a| a.id.clone()).collect()))
        }
    }

    #[derive(Debug)]
    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        fn name(&self) -> &str {
            "Failing"
        }

        async fn summarize(&self, _ctx: &QueryContext, _query: &str, _articles: &[Article]) -> Result<Summary> {
            Err(Error::Inference("backend unavailable".to_string()))
        }
    }

    struct BrokenStore;

    impl SearchStore for BrokenStore {
        fn save(&self, _query: &str, _answer: &str, _relevant_ids: &[String]) -> Result<SearchRecord> {
            Err(Error::Storage("disk on fire".to_string()))
        }

        fn list(&self) -> Result<Vec<SearchRecord>> {
            Err(Error::Storage("disk on fire".to_string()))
        }

        fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_forgot_password_end_to_end() {
        let store = Arc::new(InMemorySearchStore::new());
        let service = SearchService::new(corpus(), Arc::new(LocalSummarizer::new()), store.clone());

        let summary = service.search("I forgot my password").await.unwrap();
        assert!(summary.answer.contains("How to reset your password"));
        assert!(summary
            .answer
            .contains("To reset your password go to account settings -> reset password."));
        assert_eq!(summary.relevant_ids[0], "pw");

        let records = service.history().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].query, "I forgot my password");
        assert_eq!(records[0].answer, summary.answer);
        assert_eq!(records[0].relevant_ids, summary.relevant_ids);
    }

    #[tokio::test]
    async fn test_empty_query_is_input_error() {
        let summarizer = Arc::new(CountingSummarizer::default());
        let store = Arc::new(InMemorySearchStore::new());
        let service = SearchService::new(corpus(), summarizer.clone(), store.clone());

        let err = service.search("").await.unwrap_err();
        assert!(err.is_input_error());
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 0);
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_whitespace_query_gets_not_found_answer() {
        let store = Arc::new(InMemorySearchStore::new());
        let service = SearchService::new(corpus(), Arc::new(LocalSummarizer::new()), store.clone());

        let summary = service.search("   ").await.unwrap();
        assert!(summary.answer.contains("couldn't find any KB articles"));
        assert!(summary.relevant_ids.is_empty());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_summarization_records_nothing() {
        let store = Arc::new(InMemorySearchStore::new());
        let service = SearchService::new(corpus(), Arc::new(LocalSummarizer::new()), store.clone());

        let ctx = QueryContext::background();
        ctx.cancel();
        let err = service.search_with_context(ctx, "password").await.unwrap_err();
        assert!(!err.is_input_error());
        assert!(err.is_cancellation());
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_timeout_applies() {
        let store = Arc::new(InMemorySearchStore::new());
        let slow = LocalSummarizer::with_latency(Duration::from_secs(5));
        let service = SearchService::new(corpus(), Arc::new(slow), store.clone())
            .with_timeout(Duration::from_millis(20));

        let err = service.search("password").await.unwrap_err();
        assert!(matches!(err, Error::DeadlineExceeded(_)));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summarizer_failure_records_nothing() {
        let store = Arc::new(InMemorySearchStore::new());
        let service = SearchService::new(corpus(), Arc::new(FailingSummarizer), store.clone());

        let err = service.search("password").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert!(store.list().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_does_not_fail_query() {
        let service = SearchService::new(corpus(), Arc::new(LocalSummarizer::new()), Arc::new(BrokenStore));

        let summary = service.search("password").await.unwrap();
        assert_eq!(summary.relevant_ids, vec!["pw"]);
    }

    #[tokio::test]
    async fn test_passes_top_n_articles_to_summarizer() {
        let summarizer = Arc::new(CountingSummarizer::default());
        let store = Arc::new(InMemorySearchStore::new());
        let service = SearchService::new(corpus(), summarizer.clone(), store).with_top_n(1);

        // "e" occurs in both articles; only one may be passed along
        let summary = service.search("e").await.unwrap();
        assert_eq!(summary.relevant_ids, vec!["pw"]);
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unmatched_query_still_answers() {
        let store = Arc::new(InMemorySearchStore::new());
        let service = SearchService::new(corpus(), Arc::new(LocalSummarizer::new()), store.clone());

        let summary = service.search("kubernetes").await.unwrap();
        assert!(summary.answer.contains("couldn't find any KB articles"));
        assert!(summary.relevant_ids.is_empty());
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_history() {
        let store = Arc::new(InMemorySearchStore::new());
        let service = SearchService::new(corpus(), Arc::new(LocalSummarizer::new()), store);

        service.search("password").await.unwrap();
        service.search("network").await.unwrap();
        assert_eq!(service.history().unwrap().len(), 2);

        service.clear_history().unwrap();
        assert!(service.history().unwrap().is_empty());
    }
}
