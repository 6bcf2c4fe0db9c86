//! Countdown Timer - count a duration down and ring an alarm at zero
//! 
//! This library provides the countdown state machine, the background tick
//! loop that drives it, persistence of the last used duration, and a
//! terminal presentation layer.

pub mod config;
pub mod error;
pub mod state;
pub mod services;
pub mod tasks;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{PersistenceError, TimerError};
pub use state::AppState;
pub use ui::run_console;
pub use utils::signals::shutdown_signal;
