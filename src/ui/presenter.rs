//! Applies timer notifications to the terminal

use std::io::{self, Write};
use tracing::warn;

use super::{
    animation::WaitingIndicator,
    display::{PauseButton, Screen},
};
use crate::{
    services::AlarmPlayer,
    state::{DisplayText, TimerEvent, TimerSnapshot, TimerState},
};

/// Owns the screen, the waiting indicator and the alarm output
pub struct Presenter {
    pub screen: Screen,
    pub indicator: WaitingIndicator,
    alarm: AlarmPlayer,
    out: Box<dyn Write + Send>,
}

impl Presenter {
    pub fn new(screen: Screen, alarm: AlarmPlayer, out: Box<dyn Write + Send>) -> Self {
        Self {
            screen,
            indicator: WaitingIndicator::new(),
            alarm,
            out,
        }
    }

    /// Redraw the status line
    pub fn draw(&mut self) {
        let line = self.screen.render(self.indicator.frame());
        if let Err(e) = write!(self.out, "{}", line).and_then(|()| self.out.flush()) {
            warn!("Failed to draw timer: {}", e);
        }
    }

    /// Print a message above the status line
    pub fn message(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "\r\x1b[2K{}", text) {
            warn!("Failed to print message: {}", e);
        }
        self.draw();
    }

    /// Advance the waiting indicator by one frame
    pub fn animate(&mut self) {
        if self.indicator.advance() {
            self.draw();
        }
    }

    /// Apply one timer notification. Never waits on the alarm.
    pub fn apply(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Display(text) => self.screen.label = text,
            TimerEvent::AnimationStarted => {
                self.indicator.start();
                self.screen.button = PauseButton::Pause;
            }
            TimerEvent::AnimationStopped => {
                self.indicator.stop();
                self.screen.button = PauseButton::Disabled;
            }
            TimerEvent::Paused => self.screen.button = PauseButton::Resume,
            TimerEvent::Resumed => self.screen.button = PauseButton::Pause,
            TimerEvent::Alarm => self.alarm.play(),
        }
        self.draw();
    }

    /// Rebuild the screen from a snapshot after missed notifications
    pub fn resync(&mut self, snapshot: &TimerSnapshot) {
        self.screen.label = match snapshot.state {
            TimerState::Expired => DisplayText::TimesUp,
            _ => DisplayText::Time(snapshot.remaining_seconds),
        };
        self.screen.button = match snapshot.state {
            TimerState::Running => PauseButton::Pause,
            TimerState::Paused => PauseButton::Resume,
            TimerState::Idle | TimerState::Expired => PauseButton::Disabled,
        };
        if snapshot.state.is_active() {
            if !self.indicator.is_active() {
                self.indicator.start();
            }
        } else {
            self.indicator.stop();
        }
        self.draw();
    }

    /// End the status line, then let the alarm finish and release it
    pub async fn close(mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()?;
        self.alarm.close().await
    }
}
