//! Background deposit refresh timer.
//!
//! [`Poller`] is a two-state machine (STOPPED / RUNNING). While running, a
//! tokio task sends [`Message::PollTick`] into the control loop once per
//! period; the control loop decides whether the tick results in a fetch.
//!
//! Each `start` bumps a generation number that is stamped on every tick.
//! Ticks from an earlier generation, or ticks that arrive while stopped,
//! are rejected by [`Poller::accepts`]. A tick that was already queued in
//! the channel when `stop` ran therefore never acts after `stop` returns.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::tui::Message;

/// Lifecycle state of the [`Poller`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PollerState {
    #[default]
    Stopped,
    Running,
}

/// Single repeating timer driving deposit refreshes.
#[derive(Debug)]
pub struct Poller {
    period: Duration,
    state: PollerState,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Creates a stopped poller with the given tick period.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: PollerState::Stopped,
            generation: 0,
            handle: None,
        }
    }

    /// Starts ticking, replacing any timer that is already running.
    ///
    /// The first tick fires one full period after this call.
    pub fn start(&mut self, tx: mpsc::UnboundedSender<Message>) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!(generation = self.generation, "replaced running poller");
        }

        self.generation += 1;
        let generation = self.generation;
        let period = self.period;

        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Message::PollTick(generation)).is_err() {
                    break;
                }
            }
        }));
        self.state = PollerState::Running;
        info!(generation, period_ms = period.as_millis() as u64, "poller started");
    }

    /// Stops ticking. Calling this while stopped does nothing.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        if self.state == PollerState::Running {
            info!(generation = self.generation, "poller stopped");
        }
        self.state = PollerState::Stopped;
    }

    /// Returns `true` if a tick stamped with `generation` should act.
    pub fn accepts(&self, generation: u64) -> bool {
        self.state == PollerState::Running && generation == self.generation
    }

    /// Returns the current state.
    pub fn state(&self) -> PollerState {
        self.state
    }

    /// Returns the tick period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
