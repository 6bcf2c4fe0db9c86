//! User command parsing and dispatch

use std::sync::Arc;
use chrono::Local;
use tracing::{debug, info};

use super::presenter::Presenter;
use crate::state::{AppState, StartOutcome, TimerState};

pub const HELP: &str = "\
Commands:
  start [hh:mm:ss]  start a countdown (reuses the last entry when omitted)
  pause | resume    toggle pause
  reset             stop and clear the countdown
  theme             switch between light and dark
  status            show the current session
  quit              exit";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start(Option<String>),
    PauseResume,
    Reset,
    Theme,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse a line. Blank lines give `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => return Ok(None),
            "start" | "s" => Command::Start((!rest.is_empty()).then(|| rest.to_string())),
            "pause" | "resume" | "p" => Command::PauseResume,
            "reset" | "r" => Command::Reset,
            "theme" | "t" => Command::Theme,
            "status" => Command::Status,
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(format!("Unknown command {:?}, type 'help'", other)),
        };
        Ok(Some(command))
    }
}

/// Whether the console loop keeps going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Forward a command to the timer or handle it locally
pub async fn handle_command(state: &Arc<AppState>, presenter: &mut Presenter, command: Command) -> Flow {
    debug!("Handling command {:?}", command);
    match command {
        Command::Start(text) => {
            if let Some(text) = text {
                presenter.screen.entry = text;
            }
            let entry = presenter.screen.entry.clone();
            match state.start(&entry).await {
                Ok(StartOutcome::AlreadyRunning) => {
                    presenter.message("A countdown is already in progress");
                }
                Ok(StartOutcome::Started { .. }) => {}
                Err(e) => debug!("Start rejected: {}", e),
            }
        }
        Command::PauseResume => {
            if state.pause_resume().is_none() {
                presenter.message("Nothing to pause");
            }
        }
        Command::Reset => state.reset(),
        Command::Theme => {
            presenter.screen.toggle_theme();
            info!("Theme switched to {:?}", presenter.screen.theme);
            presenter.draw();
        }
        Command::Status => {
            let snapshot = state.snapshot();
            let started = snapshot
                .started_at
                .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            presenter.message(&format!(
                "state={:?} remaining={} total={}s started={} entry={}",
                snapshot.state,
                snapshot.remaining_hms(),
                snapshot.total_seconds,
                started,
                presenter.screen.entry
            ));
        }
        Command::Help => presenter.message(HELP),
        Command::Quit => {
            if state.snapshot().state != TimerState::Idle {
                state.reset();
            }
            return Flow::Quit;
        }
    }
    Flow::Continue
}
