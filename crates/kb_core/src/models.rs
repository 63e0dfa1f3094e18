use async_trait::async_trait;
use std::fmt;
use crate::context::QueryContext;
use crate::types::{Article, Summary};
use crate::Result;

#[async_trait]
pub trait Summarizer: Send + Sync + fmt::Debug {
    /// Human readable backend name, used in logs
    fn name(&self) -> &str;

    /// Answer `query` from `articles`, giving up as soon as `ctx` is done.
    ///
    /// A cancelled or expired context must yield its error and never a
    /// partial answer.
    async fn summarize(&self, ctx: &QueryContext, query: &str, articles: &[Article]) -> Result<Summary>;
}
