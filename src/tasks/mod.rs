//! Background tasks module
//! 
//! This module contains the tick loop that counts a session down.

pub mod tick_loop;

// Re-export main items
pub use tick_loop::{tick_loop_task, TickTimings};
