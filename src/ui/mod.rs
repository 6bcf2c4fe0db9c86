//! Terminal presentation layer
//!
//! Reads commands from the user, forwards them to the timer, and renders the
//! notifications the timer sends back.

pub mod animation;
pub mod commands;
pub mod display;
pub mod presenter;

use std::{io, sync::Arc};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::broadcast::{self, error::RecvError},
    time::{interval, MissedTickBehavior},
};
use tracing::{info, warn};

use crate::state::{AppState, TimerEvent, TimerState};
use animation::FRAME_INTERVAL;
use commands::{handle_command, Command, Flow};

pub use presenter::Presenter;

/// Run the console until the user quits.
///
/// When input ends while a countdown is running, keep going until its alarm
/// goes off so piped input like `echo "start 5" | countdown-timer` works.
/// The session state is read from the published snapshots, never by locking
/// the timer.
pub async fn run_console<R>(state: Arc<AppState>, presenter: &mut Presenter, input: R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut events = state.subscribe();
    let snapshots = state.watch_snapshot();
    let mut frames = interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut input_open = true;

    presenter.draw();

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                match line? {
                    Some(line) => match Command::parse(&line) {
                        Ok(Some(command)) => {
                            if handle_command(&state, presenter, command).await == Flow::Quit {
                                info!("Quit requested");
                                flush_pending(&mut events, presenter);
                                break;
                            }
                        }
                        Ok(None) => presenter.draw(),
                        Err(message) => presenter.message(&message),
                    },
                    None => {
                        input_open = false;
                        if snapshots.borrow().state != TimerState::Running {
                            info!("Input closed");
                            flush_pending(&mut events, presenter);
                            break;
                        }
                        info!("Input closed, waiting for the running countdown");
                    }
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    presenter.apply(event);
                    if !input_open && event == TimerEvent::Alarm {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Presenter missed {} timer events, resyncing", missed);
                    let snapshot = snapshots.borrow().clone();
                    presenter.resync(&snapshot);
                }
                Err(RecvError::Closed) => break,
            },
            _ = frames.tick(), if presenter.indicator.is_active() => presenter.animate(),
        }
    }

    Ok(())
}

/// Render notifications that are queued but not yet shown
fn flush_pending(events: &mut broadcast::Receiver<TimerEvent>, presenter: &mut Presenter) {
    while let Ok(event) = events.try_recv() {
        presenter.apply(event);
    }
}
