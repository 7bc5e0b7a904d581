//! Concurrency helpers for running many lookups.
//!
//! The bound on lookups in flight is enforced by the stream combinators in
//! the checker. This module holds the `Pacer`, which spaces request starts
//! across all workers so registries are not hammered.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::fmt;
use std::time::Duration;

type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Lets one request start per `delay`, shared by all workers.
pub struct Pacer {
    delay: Duration,
    limiter: Option<Limiter>,
}

impl Pacer {
    /// A zero delay turns pacing off.
    pub fn new(delay: Duration) -> Self {
        let limiter = Quota::with_period(delay).map(Limiter::direct);
        Self { delay, limiter }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    /// Wait for this caller's turn. Returns immediately when pacing is off.
    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl fmt::Debug for Pacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pacer").field("delay", &self.delay).finish()
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}
