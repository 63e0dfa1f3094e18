use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// Cancellation and deadline carried down into every call that may block.
///
/// Cloning shares the same token, so cancelling any clone cancels them all.
/// Work driven through [`QueryContext::run`] is dropped the moment the token
/// fires or the deadline passes; nothing keeps running in the background.
#[derive(Debug, Clone)]
pub struct QueryContext {
    token: CancellationToken,
    deadline: Option<(Instant, Duration)>,
}

impl QueryContext {
    /// A context with no deadline that is only cancelled explicitly.
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().timeout(timeout)
    }

    /// Tighten the deadline. A later deadline than the current one is ignored.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        match self.deadline {
            Some((existing, _)) if existing <= candidate => {}
            _ => self.deadline = Some((candidate, timeout)),
        }
        self
    }

    /// Use an externally owned token, e.g. one tied to the caller's lifetime.
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|(deadline, _)| deadline.saturating_duration_since(Instant::now()))
    }

    /// The error this context resolves to right now, if it is already done.
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some((deadline, timeout)) if Instant::now() >= deadline => {
                Some(Error::DeadlineExceeded(timeout))
            }
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Drive `fut` until it finishes, the token is cancelled or the deadline
    /// passes, whichever comes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let deadline = self.deadline;
        let expired = async move {
            match deadline {
                Some((deadline, timeout)) => {
                    tokio::time::sleep_until(deadline).await;
                    timeout
                }
                None => std::future::pending::<Duration>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            timeout = expired => Err(Error::DeadlineExceeded(timeout)),
            result = fut => result,
        }
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::background()
    }
}
