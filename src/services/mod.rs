//! External service management module
//! 
//! This module contains the collaborators the timer talks to outside of its
//! own state: the save file and the alarm output.

pub mod alarm;
pub mod persistence;

// Re-export main types
pub use alarm::AlarmPlayer;
pub use persistence::{LastTimerStore, DEFAULT_SAVE_FILE};
