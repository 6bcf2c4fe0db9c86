//! Timer state and the snapshot published to observers

use chrono::{DateTime, Utc};

use crate::utils::duration::format_hms;

/// Lifecycle of a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
    Expired,
}

impl TimerState {
    /// Running or Paused: a session is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, TimerState::Running | TimerState::Paused)
    }
}

/// Point-in-time copy of the countdown, published on every change
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimerSnapshot {
    pub session_id: u64,
    pub state: TimerState,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub started_at: Option<DateTime<Utc>>,
}

impl TimerSnapshot {
    /// Remaining time as "hh:mm:ss"
    pub fn remaining_hms(&self) -> String {
        format_hms(self.remaining_seconds)
    }
}
