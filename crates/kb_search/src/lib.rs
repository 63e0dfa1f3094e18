pub mod corpus;
pub mod ranker;
pub mod tokenizer;

pub use corpus::Corpus;
pub use ranker::{Ranker, ScoredArticle};
pub use tokenizer::tokenize;

pub mod prelude {
    pub use super::{Corpus, Ranker};
    pub use kb_core::{Article, Error, Result};
}
