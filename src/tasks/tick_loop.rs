//! Countdown tick loop background task

use std::{sync::Arc, time::Duration};
use tokio::{sync::oneshot, time::sleep};
use tracing::debug;

use crate::state::{AppState, TickOutcome, TimerState};

/// Wake cadence of the tick loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTimings {
    /// Time between two decrements while running
    pub tick_interval: Duration,
    /// How often a paused session is re-checked
    pub pause_poll_interval: Duration,
}

impl Default for TickTimings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            pause_poll_interval: Duration::from_millis(100),
        }
    }
}

/// Drive one session until it expires, is reset, or is superseded
pub async fn tick_loop_task(state: Arc<AppState>, session_id: u64, mut stop_rx: oneshot::Receiver<()>) {
    debug!("Tick loop started for session #{}", session_id);
    let timings = state.timings;

    loop {
        let running = match state.session_state(session_id) {
            Some(TimerState::Running) => true,
            Some(TimerState::Paused) => false,
            other => {
                debug!("Session #{} no longer active ({:?})", session_id, other);
                break;
            }
        };
        let wait = if running {
            timings.tick_interval
        } else {
            timings.pause_poll_interval
        };

        tokio::select! {
            // A dropped sender means the same as an explicit stop
            _ = &mut stop_rx => {
                debug!("Tick loop for session #{} received stop signal", session_id);
                break;
            }
            _ = sleep(wait) => {}
        }

        if running {
            match state.on_tick(session_id) {
                TickOutcome::Expired | TickOutcome::Stale => break,
                TickOutcome::Ticked { .. } | TickOutcome::Held => {}
            }
        }
    }

    debug!("Tick loop for session #{} exited", session_id);
}
