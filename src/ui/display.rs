//! Terminal rendering of the timer window

use crate::{config::Theme, state::DisplayText};

const RESET: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Pause button as shown next to the time label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseButton {
    Disabled,
    Pause,
    Resume,
}

impl PauseButton {
    fn label(&self) -> &'static str {
        match self {
            PauseButton::Disabled => "",
            PauseButton::Pause => "[Pause]",
            PauseButton::Resume => "[Resume]",
        }
    }
}

/// Everything visible on the single status line
#[derive(Debug)]
pub struct Screen {
    pub entry: String,
    pub label: DisplayText,
    pub button: PauseButton,
    pub theme: Theme,
}

impl Screen {
    /// Screen with the entry field prefilled
    pub fn new(entry: String, theme: Theme) -> Self {
        Self {
            entry,
            label: DisplayText::Time(0),
            button: PauseButton::Disabled,
            theme,
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    fn colour(&self) -> &'static str {
        match self.theme {
            Theme::Dark => "\x1b[1;92m",
            Theme::Light => "\x1b[1;34m",
        }
    }

    /// Status line for the given indicator frame, starting with a line clear
    pub fn render(&self, frame: &str) -> String {
        let line = format!(
            "{}{} {}{}{}  {}",
            CLEAR_LINE,
            frame,
            self.colour(),
            self.label,
            RESET,
            self.button.label()
        );
        line.trim_end().to_string()
    }
}
