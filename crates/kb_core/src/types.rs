use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A knowledge-base article. Never mutated once it is part of a corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
}

impl Article {
    pub fn new(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}

/// What a summarizer hands back for one query.
///
/// `relevant_ids` is whatever the backend claimed. A remote model can name
/// IDs that were never among the candidates, so this is not guaranteed to be
/// a subset of the articles passed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "ai_summary_answer")]
    pub answer: String,
    #[serde(rename = "ai_relevant_articles")]
    pub relevant_ids: Vec<String>,
}

impl Summary {
    pub fn new(answer: impl Into<String>, relevant_ids: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            relevant_ids,
        }
    }
}

/// One served query as recorded by a [`crate::SearchStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: String,
    pub query: String,
    #[serde(rename = "ai_summary_answer")]
    pub answer: String,
    #[serde(rename = "ai_relevant_articles")]
    pub relevant_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl SearchRecord {
    /// Stamps a fresh uuid and the current UTC time.
    pub fn new(query: &str, answer: &str, relevant_ids: &[String]) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query: query.to_string(),
            answer: answer.to_string(),
            relevant_ids: relevant_ids.to_vec(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_json_field_names() {
        let summary = Summary::new("Reset it from settings.", vec!["a".to_string()]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["ai_summary_answer"], "Reset it from settings.");
        assert_eq!(json["ai_relevant_articles"][0], "a");
    }

    #[test]
    fn test_search_record_ids_are_fresh() {
        let ids = vec!["a".to_string()];
        let first = SearchRecord::new("q", "answer", &ids);
        let second = SearchRecord::new("q", "answer", &ids);
        assert_ne!(first.id, second.id);
        assert_eq!(first.relevant_ids, ids);
        assert!(second.created_at >= first.created_at);
    }
}
