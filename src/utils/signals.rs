//! Signal handling for graceful shutdown

use std::io;
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::info;

/// Wait for a shutdown signal (SIGTERM, SIGINT)
pub async fn shutdown_signal() -> io::Result<()> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])?;

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
    Ok(())
}
