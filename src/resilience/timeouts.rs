//! Deadline enforcement for in-flight operations.

use std::future::Future;
use std::time::Duration;

/// The operation did not complete within its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineExceeded;

impl std::fmt::Display for DeadlineExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation deadline exceeded")
    }
}

impl std::error::Error for DeadlineExceeded {}

/// Run `operation` with an upper bound on wall-clock time.
pub async fn deadline<F>(limit: Duration, operation: F) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| DeadlineExceeded)
}
