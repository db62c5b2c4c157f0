//! Request-scoped deadlines

use std::time::Duration;

use tokio::time::Instant;

/// Default budget for a page request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Point in time by which a request should be finished
///
/// The middleware stores one in the request extensions before calling the
/// page handler. Handlers can read it to bound their own I/O:
///
/// ```rust
/// use acton_render::middleware::RequestDeadline;
/// use axum::body::Body;
/// use http::Request;
///
/// async fn load(request: &Request<Body>) {
///     if let Some(deadline) = request.extensions().get::<RequestDeadline>() {
///         let _budget = deadline.remaining();
///     }
/// }
/// ```
///
/// The deadline is cooperative: it is observed at await points and never
/// interrupts synchronous work such as template parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestDeadline {
    at: Instant,
}

impl RequestDeadline {
    /// Deadline `timeout` from now
    #[must_use]
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    /// Deadline `timeout` from now, unless `parent` expires sooner
    #[must_use]
    pub fn derive(parent: Option<&Self>, timeout: Duration) -> Self {
        let own = Self::after(timeout);
        parent.map_or(own, |parent| own.min(*parent))
    }

    /// Instant the deadline falls on
    #[must_use]
    pub const fn instant(&self) -> Instant {
        self.at
    }

    /// Time left, zero once expired
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Completes when the deadline passes
    pub async fn expired(&self) {
        tokio::time::sleep_until(self.at).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_remaining_counts_down() {
        let deadline = RequestDeadline::after(Duration::from_secs(10));
        assert_eq!(deadline.remaining(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(deadline.remaining(), Duration::from_secs(6));
        assert!(!deadline.is_expired());

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(deadline.remaining(), Duration::ZERO);
        assert!(deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shorter_parent_wins() {
        let parent = RequestDeadline::after(Duration::from_secs(2));
        let derived = RequestDeadline::derive(Some(&parent), Duration::from_secs(10));
        assert_eq!(derived, parent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_longer_parent_is_tightened() {
        let parent = RequestDeadline::after(Duration::from_secs(60));
        let derived = RequestDeadline::derive(Some(&parent), Duration::from_secs(10));
        assert_eq!(derived.remaining(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_future_completes_at_deadline() {
        let deadline = RequestDeadline::after(Duration::from_secs(10));
        let start = Instant::now();
        deadline.expired().await;
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }
}
