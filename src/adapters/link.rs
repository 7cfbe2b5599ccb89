//! Fixed-backoff reconnect supervision.
//!
//! One policy for every network link: if the link is down, try to bring
//! it up; if that fails, wait a fixed interval before the next attempt.
//! Attempts never stop and never fail the caller.

use log::{debug, info, warn};

use crate::error::CommsError;
use crate::timers::OneShot;

/// A link the supervisor can check and (re)connect.
pub trait Reconnectable {
    fn name(&self) -> &'static str;

    fn is_up(&self) -> bool;

    /// One connection attempt.  May block for a bounded handshake.
    fn try_connect(&mut self) -> Result<(), CommsError>;
}

/// Outcome of one [`LinkSupervisor::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// Up and was up on the previous poll.
    Steady,
    /// Came up on this poll.
    Connected,
    /// Went down since the previous poll.
    Lost,
    /// Down, waiting for the backoff to elapse.
    Waiting,
    /// Down, an attempt was just made and failed.
    RetryScheduled,
}

pub struct LinkSupervisor {
    backoff_ms: u64,
    retry: OneShot,
    was_up: bool,
    attempts: u32,
}

impl LinkSupervisor {
    pub fn new(backoff_ms: u64) -> Self {
        Self {
            backoff_ms,
            retry: OneShot::new(),
            was_up: false,
            attempts: 0,
        }
    }

    pub fn poll(&mut self, now_ms: u64, link: &mut impl Reconnectable) -> LinkEvent {
        if link.is_up() {
            if self.was_up {
                return LinkEvent::Steady;
            }
            self.mark_up(link.name());
            return LinkEvent::Connected;
        }

        if self.was_up {
            warn!("{}: link lost", link.name());
            self.was_up = false;
            self.retry.cancel();
            return LinkEvent::Lost;
        }

        if self.retry.is_armed() && !self.retry.poll(now_ms) {
            return LinkEvent::Waiting;
        }

        self.attempts = self.attempts.saturating_add(1);
        debug!("{}: connect attempt {}", link.name(), self.attempts);
        match link.try_connect() {
            Ok(()) if link.is_up() => {
                self.mark_up(link.name());
                LinkEvent::Connected
            }
            Ok(()) => {
                self.retry.arm_at(now_ms.saturating_add(self.backoff_ms));
                LinkEvent::RetryScheduled
            }
            Err(e) => {
                warn!(
                    "{}: {e}, retrying in {} ms",
                    link.name(),
                    self.backoff_ms
                );
                self.retry.arm_at(now_ms.saturating_add(self.backoff_ms));
                LinkEvent::RetryScheduled
            }
        }
    }

    /// Attempts since the link was last up.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn mark_up(&mut self, name: &str) {
        info!("{name}: link up after {} attempt(s)", self.attempts);
        self.was_up = true;
        self.attempts = 0;
        self.retry.cancel();
    }
}
