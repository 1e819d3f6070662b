//! Test utilities for Parley
//!
//! This module provides common test utilities for driving the session
//! layer against the in-process collaborators.

use std::future::Future;
use std::time::Duration;

/// Poll a condition until it holds or a short deadline passes
///
/// # Returns
///
/// Returns `true` if the condition held within the deadline
///
/// # Examples
///
/// ```ignore
/// let ok = eventually(|| async { session.identity().await.is_some() }).await;
/// assert!(ok);
/// ```
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
