use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Holds the latest value until it has been quiet for `delay`
///
/// Each [`Debounce::push`] replaces the pending value and restarts the timer.
#[derive(Debug)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// Drop the pending value, if any
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolve with the pending value once its deadline passes
    ///
    /// Never resolves while nothing is pending. Cancel-safe: dropping the
    /// future before the deadline leaves the value pending.
    pub async fn fire(&mut self) -> T {
        let Some(deadline) = self.pending.as_ref().map(|(_, deadline)| *deadline) else {
            return std::future::pending().await;
        };

        sleep_until(deadline).await;

        match self.pending.take() {
            Some((value, _)) => value,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    const DELAY: Duration = Duration::from_millis(300);

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_fires() {
        let mut debounce = Debounce::new(DELAY);
        debounce.push("c");
        advance(Duration::from_millis(100)).await;
        debounce.push("ch");
        advance(Duration::from_millis(100)).await;
        debounce.push("char");

        let start = Instant::now();
        assert_eq!(debounce.fire().await, "char");
        assert!(start.elapsed() >= DELAY);
        assert!(!debounce.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_restarts_timer() {
        let mut debounce = Debounce::new(DELAY);
        debounce.push(1);
        advance(Duration::from_millis(250)).await;
        debounce.push(2);

        assert!(timeout(Duration::from_millis(299), debounce.fire()).await.is_err());
        assert!(debounce.is_pending());
        assert_eq!(debounce.fire().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_clears_pending() {
        let mut debounce = Debounce::new(DELAY);
        debounce.push("x");
        assert_eq!(debounce.cancel(), Some("x"));
        assert!(!debounce.is_pending());
        assert!(timeout(Duration::from_secs(10), debounce.fire()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_fires_immediately() {
        let mut debounce = Debounce::new(Duration::ZERO);
        debounce.push("now");
        assert_eq!(debounce.fire().await, "now");
    }
}
