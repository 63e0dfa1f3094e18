pub mod context;
pub mod error;
pub mod models;
pub mod storage;
pub mod types;

pub use context::QueryContext;
pub use error::{Error, Result};
pub use models::Summarizer;
pub use storage::SearchStore;
pub use types::{Article, SearchRecord, Summary};
