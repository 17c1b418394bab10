//! The wait/send loop.
//!
//! The dispatcher alternates between two states:
//!
//! - **Waiting**: polls the clock at a coarse interval until the next
//!   scheduled occurrence is reached (skipped entirely in immediate mode).
//! - **Sending**: posts the parent message, then each reply into the
//!   parent's thread with a short delay between posts.
//!
//! A failed post abandons the remainder of that cycle; the loop carries on
//! to the following week. Nothing is retried.

use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::clock::Clock;
use crate::message::MessageSet;
use crate::schedule::ScheduleSpec;
use crate::slack::{ChatClient, PostError};

/// How often the waiting state re-checks the clock.
const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Pause between consecutive thread replies.
const REPLY_DELAY: Duration = Duration::from_secs(1);

/// Pause after a send cycle before computing the next occurrence.
const CYCLE_COOLDOWN: Duration = Duration::from_secs(60);

/// Whether to honor the schedule or post right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Wait for each weekly occurrence; runs until the process is killed.
    Scheduled,
    /// Post one cycle immediately and return. Used for manual verification.
    Immediate,
}

/// Posts a message set to one channel on a weekly schedule.
///
/// Single-threaded and strictly sequential: every post completes (or fails)
/// before the next one starts. The clock is injected so tests can drive the
/// loop without real delays.
pub struct Dispatcher<C, K> {
    client: C,
    clock: K,
    channel: String,
    spec: ScheduleSpec,
    messages: MessageSet,
    poll_interval: Duration,
    reply_delay: Duration,
    cycle_cooldown: Duration,
}

impl<C: ChatClient, K: Clock> Dispatcher<C, K> {
    /// Create a dispatcher with the default intervals.
    pub fn new(
        client: C,
        clock: K,
        channel: impl Into<String>,
        spec: ScheduleSpec,
        messages: MessageSet,
    ) -> Self {
        Self {
            client,
            clock,
            channel: channel.into(),
            spec,
            messages,
            poll_interval: POLL_INTERVAL,
            reply_delay: REPLY_DELAY,
            cycle_cooldown: CYCLE_COOLDOWN,
        }
    }

    /// Override the polling, reply and cooldown intervals (used in tests).
    pub fn with_intervals(
        mut self,
        poll_interval: Duration,
        reply_delay: Duration,
        cycle_cooldown: Duration,
    ) -> Self {
        self.poll_interval = poll_interval;
        self.reply_delay = reply_delay;
        self.cycle_cooldown = cycle_cooldown;
        self
    }

    /// Run the dispatcher.
    ///
    /// In [`RunMode::Immediate`] this performs exactly one send cycle and
    /// returns. In [`RunMode::Scheduled`] it loops forever: compute the next
    /// occurrence, wait for it, send, cool down, repeat.
    pub async fn run(&self, mode: RunMode) {
        match mode {
            RunMode::Immediate => {
                if let Err(e) = self.send_cycle().await {
                    error!(channel = %self.channel, error = %e, "Send cycle failed");
                }
            }
            RunMode::Scheduled => loop {
                let target = self.spec.next_occurrence(self.clock.now());
                info!("Next scheduled run: {}", target);

                self.wait_until(target).await;

                if let Err(e) = self.send_cycle().await {
                    error!(
                        channel = %self.channel,
                        error = %e,
                        "Send cycle failed; remaining messages skipped until next week"
                    );
                }

                self.clock.sleep(self.cycle_cooldown).await;
            },
        }
    }

    /// Coarse poll-sleep until the clock reaches `target`.
    async fn wait_until(&self, target: NaiveDateTime) {
        while self.clock.now() < target {
            self.clock.sleep(self.poll_interval).await;
        }
    }

    /// Post the parent message, then each reply into its thread.
    async fn send_cycle(&self) -> Result<(), PostError> {
        let parent = self
            .client
            .post_message(&self.channel, self.messages.parent(), None)
            .await?;
        info!(ts = %parent.ts, "Parent message sent: {}", self.messages.parent());

        for message in self.messages.replies() {
            self.clock.sleep(self.reply_delay).await;
            self.client
                .post_message(&self.channel, message, Some(&parent.ts))
                .await?;
            info!("Reply sent: {}", message);
        }

        Ok(())
    }
}
