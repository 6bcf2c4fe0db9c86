//! Countdown Timer - count a duration down and ring an alarm at zero
//! 
//! This is the main entry point for the countdown-timer application.

use std::{io, sync::Arc};
use tokio::io::BufReader;
use tracing::info;

use countdown_timer::{
    config::Config,
    services::{AlarmPlayer, LastTimerStore},
    state::AppState,
    ui::{commands::HELP, display::Screen, run_console, Presenter},
    utils::{format_hms, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so they do not clobber the timer line on stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_timer={}", config.log_level()))
        .with_writer(io::stderr)
        .init();

    info!("Starting countdown-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: save_file={}, theme={:?}, bells={}, mute={}",
          config.save_file.display(), config.theme, config.bell_count, config.mute);

    let store = LastTimerStore::new(config.save_file.clone());
    let entry = format_hms(store.load());
    let state = Arc::new(AppState::new(store));

    // The alarm output lives for the whole process and is released on exit
    let alarm = AlarmPlayer::stdout(config.bell_count, config.mute);
    let mut presenter = Presenter::new(Screen::new(entry, config.theme), alarm, Box::new(io::stdout()));
    presenter.message(HELP);

    let console = run_console(
        Arc::clone(&state),
        &mut presenter,
        BufReader::new(tokio::io::stdin()),
    );

    tokio::select! {
        result = console => {
            if let Err(e) = result {
                tracing::error!("Console error: {}", e);
            }
        }
        result = shutdown_signal() => {
            result?;
            info!("Shutdown signal received");
        }
    }

    state.reset();
    presenter.close().await?;
    info!("Shutdown complete");
    Ok(())
}
