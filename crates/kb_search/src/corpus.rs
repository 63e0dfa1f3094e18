use std::collections::HashSet;
use std::path::Path;

use kb_core::{Article, Error, Result};
use tracing::debug;

/// The fixed set of articles queries are answered from.
///
/// Built once and then only read, so it can be shared between request tasks
/// behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    articles: Vec<Article>,
}

impl Corpus {
    /// Build a corpus, rejecting duplicate or empty article IDs.
    pub fn new(articles: Vec<Article>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(articles.len());
        for article in &articles {
            if article.id.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "article '{}' has an empty id",
                    article.title
                )));
            }
            if !seen.insert(article.id.as_str()) {
                return Err(Error::InvalidInput(format!(
                    "duplicate article id: {}",
                    article.id
                )));
            }
        }
        Ok(Self { articles })
    }

    /// The built-in help desk articles, each with a freshly generated id.
    pub fn sample() -> Self {
        let article = |title: &str, content: &str| {
            Article::new(uuid::Uuid::new_v4().to_string(), title, content)
        };
        Self {
            articles: vec![
                article(
                    "How to reset your password",
                    "To reset your password go to account settings -> reset password. If you don't get an email check spam.",
                ),
                article(
                    "Troubleshooting network connectivity",
                    "Check that cable is plugged in, ensure DHCP is enabled, try 'ipconfig /renew' on Windows or 'dhclient' on Linux.",
                ),
                article(
                    "Installing Node.js on Ubuntu",
                    "Use apt to install node: curl -fsSL https://deb.nodesource.com/setup_18.x | sudo -E bash - && sudo apt-get install -y nodejs",
                ),
                article(
                    "Email SMTP misconfiguration",
                    "If sending fails, verify SMTP host, port, TLS settings and credentials. Use telnet to test connection.",
                ),
            ],
        }
    }

    /// Load a JSON array of `{id, title, content}` objects.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let articles: Vec<Article> = serde_json::from_str(&raw)?;
        debug!("Loaded {} articles from {}", articles.len(), path.display());
        Self::new(articles)
    }

    pub fn all(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
