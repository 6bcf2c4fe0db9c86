//! Audible alarm played when a countdown expires

use std::{
    io::{self, Write},
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{task::JoinHandle, time::sleep};
use tracing::{debug, error, info};

const BELL: &[u8] = b"\x07";
const BELL_SPACING: Duration = Duration::from_millis(300);

type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Terminal-bell alarm.
///
/// Created once at start-up and handed to the presenter, which closes it
/// on shutdown. Bells ring on a background task so the caller never waits.
pub struct AlarmPlayer {
    sink: Sink,
    bell_count: u32,
    muted: bool,
    ringing: Option<JoinHandle<()>>,
}

impl AlarmPlayer {
    pub fn new(sink: Box<dyn Write + Send>, bell_count: u32, muted: bool) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            bell_count,
            muted,
            ringing: None,
        }
    }

    /// Alarm ringing on the process' stdout
    pub fn stdout(bell_count: u32, muted: bool) -> Self {
        info!("Alarm ready ({} bells{})", bell_count, if muted { ", muted" } else { "" });
        Self::new(Box::new(io::stdout()), bell_count, muted)
    }

    /// Start ringing `bell_count` bells. A ring still in progress is cut
    /// short. Must be called from within a tokio runtime.
    pub fn play(&mut self) {
        if self.muted {
            debug!("Alarm muted, skipping playback");
            return;
        }
        if let Some(previous) = self.ringing.take() {
            previous.abort();
        }

        info!("Playing alarm");
        let sink = Arc::clone(&self.sink);
        let bell_count = self.bell_count;
        self.ringing = Some(tokio::spawn(async move {
            for i in 0..bell_count {
                if i > 0 {
                    sleep(BELL_SPACING).await;
                }
                if let Err(e) = ring_once(&sink) {
                    error!("Failed to play alarm: {}", e);
                    return;
                }
            }
        }));
    }

    /// Let a ring in progress finish, then flush and release the output
    pub async fn close(mut self) -> io::Result<()> {
        if let Some(ringing) = self.ringing.take() {
            if let Err(e) = ringing.await {
                debug!("Alarm task ended early: {}", e);
            }
        }
        debug!("Releasing alarm output");
        lock_sink(&self.sink).flush()
    }
}

fn ring_once(sink: &Sink) -> io::Result<()> {
    let mut out = lock_sink(sink);
    out.write_all(BELL)?;
    out.flush()
}

fn lock_sink(sink: &Sink) -> std::sync::MutexGuard<'_, Box<dyn Write + Send>> {
    sink.lock().unwrap_or_else(|e| {
        error!("Alarm output mutex was poisoned, recovering");
        e.into_inner()
    })
}
