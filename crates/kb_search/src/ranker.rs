use std::collections::HashSet;
use std::sync::Arc;

use kb_core::Article;

use crate::corpus::Corpus;
use crate::tokenizer::tokenize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredArticle {
    pub article: Article,
    pub score: usize,
}

/// Term-overlap ranking over a fixed corpus.
///
/// An article scores one point for every distinct query token found anywhere
/// inside its lowercased `title + " " + content`, including inside longer
/// words ("pass" matches "password").
#[derive(Debug, Clone)]
pub struct Ranker {
    corpus: Arc<Corpus>,
    haystacks: Arc<Vec<String>>,
}

impl Ranker {
    pub fn new(corpus: Arc<Corpus>) -> Self {
        let haystacks = corpus
            .all()
            .iter()
            .map(|a| format!("{} {}", a.title, a.content).to_lowercase())
            .collect();
        Self {
            corpus,
            haystacks: Arc::new(haystacks),
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Up to `top_n` matching articles, best first.
    pub fn rank(&self, query: &str, top_n: usize) -> Vec<Article> {
        self.rank_scored(query, top_n)
            .into_iter()
            .map(|scored| scored.article)
            .collect()
    }

    /// Same as [`Ranker::rank`] but keeps the scores.
    pub fn rank_scored(&self, query: &str, top_n: usize) -> Vec<ScoredArticle> {
        if query.is_empty() || top_n == 0 {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let terms: Vec<String> = tokenize(query)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredArticle> = self
            .corpus
            .all()
            .iter()
            .zip(self.haystacks.iter())
            .filter_map(|(article, text)| {
                let score = terms.iter().filter(|t| text.contains(t.as_str())).count();
                (score > 0).then(|| ScoredArticle {
                    article: article.clone(),
                    score,
                })
            })
            .collect();

        // sort_by is stable: equal scores keep corpus order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(top_n);
        scored
    }
}
