//! # Live Poller
//!
//! Repeatedly asks a [`LiveFeed`] for rows newer than what it already has.
//! The poller is an explicit state machine:
//!
//! ```text
//!  Idle ──run──▶ Polling ──error──▶ Backoff { attempt, delay }
//!                  ▲                    │
//!                  └──────success───────┘
//! ```
//!
//! While polling, ticks are `interval` apart. After a failure the delay
//! doubles per consecutive failure, starting from `interval` and capped at
//! `max_backoff`; the first success returns to the fixed interval. Flipping
//! the cancel channel to `true` (or dropping its sender) stops the loop
//! between ticks and leaves the poller `Idle`.

use std::fmt::Display;
use tokio::sync::watch;
use tokio::time::Duration;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(4);
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Source of live rows. `poll` returns how many rows were new.
#[async_trait::async_trait]
pub trait LiveFeed: Send {
    type Error: Display + Send;

    async fn poll(&mut self) -> Result<usize, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling,
    Backoff { attempt: u32, delay: Duration },
}

pub struct LivePoller {
    interval: Duration,
    max_backoff: Duration,
    state: PollState,
}

impl LivePoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_backoff: MAX_BACKOFF,
            state: PollState::Idle,
        }
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Wait before the next tick in the current state.
    pub fn next_delay(&self) -> Duration {
        match self.state {
            PollState::Backoff { delay, .. } => delay,
            PollState::Idle | PollState::Polling => self.interval,
        }
    }

    fn on_success(&mut self) {
        self.state = PollState::Polling;
    }

    fn on_failure(&mut self) {
        let attempt = match self.state {
            PollState::Backoff { attempt, .. } => attempt.saturating_add(1),
            PollState::Idle | PollState::Polling => 1,
        };
        let factor = 2u32.saturating_pow(attempt);
        let delay = self
            .interval
            .checked_mul(factor)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff));
        self.state = PollState::Backoff { attempt, delay };
    }

    /// Poll `feed` until cancelled. Returns the total of new rows reported.
    pub async fn run<F: LiveFeed>(&mut self, feed: &mut F, mut cancel: watch::Receiver<bool>) -> usize {
        let mut received = 0;
        if *cancel.borrow() {
            return received;
        }
        self.state = PollState::Polling;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.next_delay()) => {}
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        break;
                    }
                    continue;
                }
            }

            match feed.poll().await {
                Ok(count) => {
                    received += count;
                    self.on_success();
                }
                Err(e) => {
                    self.on_failure();
                    eprintln!("Live poll failed ({}); retrying in {:?}", e, self.next_delay());
                }
            }
        }

        self.state = PollState::Idle;
        received
    }
}

impl Default for LivePoller {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}
