//! State management module
//! 
//! This module contains the countdown state machine and the shared state
//! that coordinates it with the tick loop and the presentation layer.

pub mod app_state;
pub mod events;
pub mod session;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use events::{DisplayText, TimerEvent};
pub use session::{CountdownSession, StartOutcome, TickOutcome};
pub use timer_state::{TimerSnapshot, TimerState};
