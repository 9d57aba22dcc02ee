//! Injectable pacing between consecutive order submissions.
//!
//! Multi-leg transitions submit strictly sequentially with a minimum pause
//! between legs. This is a deliberate throttle for the brokerage's rate
//! limits, not an optimization target; tests swap in the no-op pacer.

use async_trait::async_trait;
use std::time::Duration;

/// Pause strategy applied between order submissions.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Suspends the current transition for one pacing interval.
    async fn pause(&self);
}

/// Production pacer: a fixed sleep between legs.
#[derive(Debug, Clone, Copy)]
pub struct IntervalPacer(pub Duration);

impl IntervalPacer {
    /// Pacer with the given inter-order delay in milliseconds.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

#[async_trait]
impl Pacer for IntervalPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Zero-delay pacer for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPacer;

#[async_trait]
impl Pacer for NoopPacer {
    async fn pause(&self) {}
}
