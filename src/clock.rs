//! Injectable time source for the dispatcher loop.
//!
//! The dispatcher only ever reads the current time and sleeps, so both are
//! behind a trait. Production uses [`SystemClock`]; tests use the simulated
//! clock from [`crate::testing`] to run cycles without real delays.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use std::time::Duration;

/// A source of the current local time and a way to wait.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Current local time, naive (no timezone attached).
    fn now(&self) -> NaiveDateTime;

    /// Suspend for the given duration.
    async fn sleep(&self, duration: Duration);
}

/// The real wall clock: `chrono::Local` plus `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
