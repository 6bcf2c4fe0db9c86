//! Notifications sent from the timer to the presentation layer

use std::fmt;

use crate::utils::duration::format_hms;

/// What the time label should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayText {
    Time(u64),
    Invalid,
    TimesUp,
}

impl fmt::Display for DisplayText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayText::Time(seconds) => f.write_str(&format_hms(*seconds)),
            DisplayText::Invalid => f.write_str("Invalid"),
            DisplayText::TimesUp => f.write_str("Time's up!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Display(DisplayText),
    AnimationStarted,
    AnimationStopped,
    Paused,
    Resumed,
    Alarm,
}
