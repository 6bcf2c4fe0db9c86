//! Countdown session state machine
//!
//! Pure transitions with no I/O. Every started session gets a fresh id so
//! that ticks from a superseded loop can be told apart and rejected.

use std::num::NonZeroU64;
use chrono::Utc;

use super::{TimerSnapshot, TimerState};

/// Result of [`CountdownSession::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started { session_id: u64 },
    /// A session is running or paused and was left as is
    AlreadyRunning,
}

/// Result of [`CountdownSession::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One second counted down, more remain
    Ticked { remaining_seconds: u64 },
    /// The countdown reached zero on this tick
    Expired,
    /// The session is paused; nothing changed
    Held,
    /// The tick belongs to a finished or superseded session
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct CountdownSession {
    snapshot: TimerSnapshot,
}

impl CountdownSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TimerState {
        self.snapshot.state
    }

    pub fn session_id(&self) -> u64 {
        self.snapshot.session_id
    }

    pub fn total_seconds(&self) -> u64 {
        self.snapshot.total_seconds
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.snapshot.remaining_seconds
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.snapshot.clone()
    }

    /// Start a new session unless one is running or paused
    pub fn begin(&mut self, total_seconds: NonZeroU64) -> StartOutcome {
        if self.snapshot.state.is_active() {
            return StartOutcome::AlreadyRunning;
        }

        let session_id = self.snapshot.session_id.wrapping_add(1);
        self.snapshot = TimerSnapshot {
            session_id,
            state: TimerState::Running,
            total_seconds: total_seconds.get(),
            remaining_seconds: total_seconds.get(),
            started_at: Some(Utc::now()),
        };
        StartOutcome::Started { session_id }
    }

    /// Toggle Running and Paused. Returns the new state, or `None` when
    /// there is nothing to toggle.
    pub fn toggle_pause(&mut self) -> Option<TimerState> {
        let next = match self.snapshot.state {
            TimerState::Running => TimerState::Paused,
            TimerState::Paused => TimerState::Running,
            TimerState::Idle | TimerState::Expired => return None,
        };
        self.snapshot.state = next;
        Some(next)
    }

    /// Return to Idle from any state. The session id is kept so that a
    /// loop still sleeping on it sees its next tick rejected.
    pub fn reset(&mut self) {
        self.snapshot.state = TimerState::Idle;
        self.snapshot.remaining_seconds = 0;
        self.snapshot.started_at = None;
    }

    /// Apply one tick on behalf of the loop owning `session_id`
    pub fn tick(&mut self, session_id: u64) -> TickOutcome {
        if session_id != self.snapshot.session_id {
            return TickOutcome::Stale;
        }
        match self.snapshot.state {
            TimerState::Paused => TickOutcome::Held,
            TimerState::Idle | TimerState::Expired => TickOutcome::Stale,
            TimerState::Running => {
                self.snapshot.remaining_seconds = self.snapshot.remaining_seconds.saturating_sub(1);
                if self.snapshot.remaining_seconds == 0 {
                    self.snapshot.state = TimerState::Expired;
                    TickOutcome::Expired
                } else {
                    TickOutcome::Ticked {
                        remaining_seconds: self.snapshot.remaining_seconds,
                    }
                }
            }
        }
    }
}
