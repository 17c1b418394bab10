//! Testing utilities for exercising the dispatcher without network or time.
//!
//! - [`RecordingClient`]: a [`ChatClient`] that records every post and can be
//!   told to fail on a specific call
//! - [`SimulatedClock`]: a [`Clock`] whose `sleep` advances simulated time
//!   instantly instead of waiting

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::Clock;
use crate::slack::{ChatClient, PostError, PostedMessage, ThreadTs};

/// One post observed by a [`RecordingClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPost {
    /// Channel the message was posted to.
    pub channel: String,
    /// Message text.
    pub text: String,
    /// Thread the message was nested under, if any.
    pub thread: Option<ThreadTs>,
}

/// A chat client that records calls instead of talking to Slack.
///
/// Each successful call is issued a deterministic timestamp, so tests can
/// check that replies carry the timestamp returned for the parent post.
/// Cloning shares the recorded call list.
///
/// # Example
///
/// ```
/// use rollcall::testing::RecordingClient;
///
/// // Succeeds twice, then fails on the 3rd call
/// let client = RecordingClient::failing_on(3);
/// assert_eq!(client.call_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct RecordingClient {
    calls: Arc<Mutex<Vec<RecordedPost>>>,
    fail_on_call: Option<usize>,
}

impl RecordingClient {
    /// Create a client that succeeds on every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client that fails on the given 1-based call number.
    ///
    /// The failing call is still recorded.
    pub fn failing_on(call: usize) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on_call: Some(call),
        }
    }

    /// All posts observed so far, in order.
    pub fn calls(&self) -> Vec<RecordedPost> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Number of posts observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock poisoned").len()
    }

    /// The timestamp this client issued for the given 0-based call index.
    pub fn issued_ts(&self, index: usize) -> ThreadTs {
        Self::ts_for_call(index + 1)
    }

    fn ts_for_call(call: usize) -> ThreadTs {
        ThreadTs::new(format!("1700000000.{:06}", call))
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread: Option<&ThreadTs>,
    ) -> Result<PostedMessage, PostError> {
        let call_number = {
            let mut calls = self.calls.lock().expect("lock poisoned");
            calls.push(RecordedPost {
                channel: channel.to_string(),
                text: text.to_string(),
                thread: thread.cloned(),
            });
            calls.len()
        };

        if self.fail_on_call == Some(call_number) {
            return Err(PostError::Api {
                code: "channel_not_found".to_string(),
            });
        }

        Ok(PostedMessage {
            ts: Self::ts_for_call(call_number),
        })
    }
}

/// A clock whose sleeps advance simulated time instantly.
///
/// `sleep` records the requested duration, moves the simulated time forward
/// by that amount, and yields to the runtime without actually waiting, so
/// waiting states resolve deterministically. Cloning shares the simulated
/// time and the sleep log.
#[derive(Clone)]
pub struct SimulatedClock {
    now: Arc<Mutex<NaiveDateTime>>,
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl SimulatedClock {
    /// Create a clock starting at the given instant.
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
            sleeps: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Move simulated time forward without recording a sleep.
    pub fn advance(&self, duration: Duration) {
        let mut now = self.now.lock().expect("lock poisoned");
        *now += chrono::Duration::from_std(duration).expect("duration in range");
    }

    /// Every duration passed to `sleep` so far, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Clock for SimulatedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().expect("lock poisoned")
    }

    async fn sleep(&self, duration: Duration) {
        {
            let mut now = self.now.lock().expect("lock poisoned");
            *now += chrono::Duration::from_std(duration).expect("duration in range");
            self.sleeps.lock().expect("lock poisoned").push(duration);
        }
        // Yield so callers wrapping the loop in a timeout can be cancelled.
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_recording_client_issues_stable_timestamps() {
        let client = RecordingClient::new();

        let first = client.post_message("C1", "a", None).await.unwrap();
        let second = client.post_message("C1", "b", None).await.unwrap();

        assert_eq!(first.ts, client.issued_ts(0));
        assert_eq!(second.ts, client.issued_ts(1));
        assert_ne!(first.ts, second.ts);
    }

    #[tokio::test]
    async fn test_failing_client_records_the_failed_call() {
        let client = RecordingClient::failing_on(1);

        let result = client.post_message("C1", "a", None).await;

        assert!(result.is_err());
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_simulated_clock_advances_on_sleep() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let clock = SimulatedClock::starting_at(start);

        clock.sleep(Duration::from_secs(90)).await;

        assert_eq!(clock.now(), start + chrono::Duration::seconds(90));
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(90)]);
    }
}
