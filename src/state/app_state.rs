//! Main application state management

use std::{
    num::NonZeroU64,
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::sync::{broadcast, oneshot, watch};
use tracing::{debug, error, info, warn};

use super::{
    events::{DisplayText, TimerEvent},
    session::{CountdownSession, StartOutcome, TickOutcome},
    TimerSnapshot, TimerState,
};
use crate::{
    error::TimerError,
    services::LastTimerStore,
    tasks::{tick_loop_task, TickTimings},
    utils::duration::parse_hms,
};

/// Stop signal for the tick loop of one session
#[derive(Debug)]
struct TickHandle {
    session_id: u64,
    stop_tx: oneshot::Sender<()>,
}

/// Owns the countdown session and fans its changes out to observers
#[derive(Debug)]
pub struct AppState {
    session: Mutex<CountdownSession>,
    tick_handle: Mutex<Option<TickHandle>>,
    store: LastTimerStore,
    pub timings: TickTimings,
    /// Notifications for the presentation layer
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Latest snapshot of the session
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create an idle AppState with the default tick cadence
    pub fn new(store: LastTimerStore) -> Self {
        Self::with_timings(store, TickTimings::default())
    }

    pub fn with_timings(store: LastTimerStore, timings: TickTimings) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerSnapshot::default());

        Self {
            session: Mutex::new(CountdownSession::new()),
            tick_handle: Mutex::new(None),
            store,
            timings,
            event_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Parse `text` and start a countdown.
    ///
    /// Invalid input only changes the display when no session is in
    /// progress. Starting while a session is running or paused changes
    /// nothing. The duration is saved off the async workers before the tick
    /// loop is spawned.
    pub async fn start(self: &Arc<Self>, text: &str) -> Result<StartOutcome, TimerError> {
        let total_seconds = match parse_positive(text) {
            Ok(seconds) => seconds,
            Err(e) => {
                warn!("Rejected duration input: {}", e);
                if self.lock_session().state().is_active() {
                    debug!("Session in progress, leaving its display untouched");
                } else {
                    self.emit(TimerEvent::Display(DisplayText::Invalid));
                }
                return Err(e);
            }
        };

        let (outcome, snapshot) = {
            let mut session = self.lock_session();
            let outcome = session.begin(total_seconds);
            (outcome, session.snapshot())
        };

        match outcome {
            StartOutcome::AlreadyRunning => {
                debug!("Start ignored, countdown #{} is {:?}", snapshot.session_id, snapshot.state);
            }
            StartOutcome::Started { session_id } => {
                info!("Starting countdown #{} for {}", session_id, snapshot.remaining_hms());
                self.publish(snapshot);
                self.persist(total_seconds.get()).await;
                self.emit(TimerEvent::Display(DisplayText::Time(total_seconds.get())));
                self.emit(TimerEvent::AnimationStarted);
                self.spawn_tick_loop(session_id);
            }
        }

        Ok(outcome)
    }

    /// Toggle between Running and Paused; no-op in any other state
    pub fn pause_resume(&self) -> Option<TimerState> {
        let (next, snapshot) = {
            let mut session = self.lock_session();
            let next = session.toggle_pause();
            (next, session.snapshot())
        };

        match next {
            Some(TimerState::Paused) => {
                info!("Countdown paused at {}", snapshot.remaining_hms());
                self.publish(snapshot);
                self.emit(TimerEvent::Paused);
            }
            Some(_) => {
                info!("Countdown resumed at {}", snapshot.remaining_hms());
                self.publish(snapshot);
                self.emit(TimerEvent::Resumed);
            }
            None => debug!("Pause/resume ignored in state {:?}", snapshot.state),
        }

        next
    }

    /// Return to Idle and stop any running tick loop
    pub fn reset(&self) {
        let snapshot = {
            let mut session = self.lock_session();
            session.reset();
            session.snapshot()
        };

        if let Some(handle) = self.lock_tick_handle().take() {
            debug!("Stopping tick loop for session #{}", handle.session_id);
            // The loop may have exited already, closing its receiver
            let _ = handle.stop_tx.send(());
        }

        info!("Countdown reset");
        self.publish(snapshot);
        self.emit(TimerEvent::Display(DisplayText::Time(0)));
        self.emit(TimerEvent::AnimationStopped);
    }

    /// Apply one tick on behalf of the loop owning `session_id`
    pub fn on_tick(&self, session_id: u64) -> TickOutcome {
        let (outcome, snapshot) = {
            let mut session = self.lock_session();
            let outcome = session.tick(session_id);
            (outcome, session.snapshot())
        };

        match outcome {
            TickOutcome::Ticked { remaining_seconds } => {
                debug!("Tick #{}: {}s remaining", session_id, remaining_seconds);
                self.publish(snapshot);
                self.emit(TimerEvent::Display(DisplayText::Time(remaining_seconds)));
            }
            TickOutcome::Expired => {
                info!(
                    "Countdown #{} finished after {}s",
                    session_id, snapshot.total_seconds
                );
                self.release_tick_handle(session_id);
                self.publish(snapshot);
                self.emit(TimerEvent::Display(DisplayText::TimesUp));
                self.emit(TimerEvent::AnimationStopped);
                self.emit(TimerEvent::Alarm);
            }
            TickOutcome::Held => {}
            TickOutcome::Stale => debug!("Dropped stale tick from session #{}", session_id),
        }

        outcome
    }

    /// State of `session_id`, or `None` once it has been superseded
    pub fn session_state(&self, session_id: u64) -> Option<TimerState> {
        let session = self.lock_session();
        (session.session_id() == session_id).then(|| session.state())
    }

    /// Get current session snapshot
    pub fn snapshot(&self) -> TimerSnapshot {
        self.lock_session().snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    pub fn watch_snapshot(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Save the duration on the blocking pool. Failures are logged only.
    async fn persist(&self, total_seconds: u64) {
        let store = self.store.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || store.save(total_seconds)).await {
            warn!("Save task for last timer failed: {}", e);
        }
    }

    fn spawn_tick_loop(self: &Arc<Self>, session_id: u64) {
        let (stop_tx, stop_rx) = oneshot::channel();
        let previous = self
            .lock_tick_handle()
            .replace(TickHandle { session_id, stop_tx });

        if let Some(previous) = previous {
            debug!("Session #{} supersedes session #{}", session_id, previous.session_id);
            let _ = previous.stop_tx.send(());
        }

        let state = Arc::clone(self);
        tokio::spawn(async move {
            tick_loop_task(state, session_id, stop_rx).await;
        });
    }

    fn release_tick_handle(&self, session_id: u64) {
        let mut handle = self.lock_tick_handle();
        if handle.as_ref().is_some_and(|h| h.session_id == session_id) {
            handle.take();
        }
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to publish timer snapshot: {}", e);
        }
    }

    fn emit(&self, event: TimerEvent) {
        // Nobody listening is fine, e.g. before the presenter starts
        if self.event_tx.send(event).is_err() {
            debug!("No listeners for {:?}", event);
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, CountdownSession> {
        self.session.lock().unwrap_or_else(|e| {
            error!("Session mutex was poisoned, recovering");
            e.into_inner()
        })
    }

    fn lock_tick_handle(&self) -> MutexGuard<'_, Option<TickHandle>> {
        self.tick_handle.lock().unwrap_or_else(|e| {
            error!("Tick handle mutex was poisoned, recovering");
            e.into_inner()
        })
    }
}

fn parse_positive(text: &str) -> Result<NonZeroU64, TimerError> {
    let seconds = parse_hms(text)?;
    NonZeroU64::new(seconds).ok_or_else(|| TimerError::InvalidDuration(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::sleep;

    fn new_state(dir: &TempDir) -> Arc<AppState> {
        Arc::new(AppState::new(LastTimerStore::new(dir.path().join("last_timer.json"))))
    }

    fn saved(dir: &TempDir) -> u64 {
        LastTimerStore::new(dir.path().join("last_timer.json")).load()
    }

    fn drain(rx: &mut broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_publishes_and_persists() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);
        let mut rx = state.subscribe();

        let outcome = state.start("00:02:05").await.unwrap();
        assert_eq!(outcome, StartOutcome::Started { session_id: 1 });

        let snapshot = state.snapshot();
        assert_eq!(snapshot.state, TimerState::Running);
        assert_eq!(snapshot.total_seconds, 125);
        assert_eq!(snapshot.remaining_seconds, 125);
        assert_eq!(*state.watch_snapshot().borrow(), snapshot);
        assert_eq!(saved(&dir), 125);

        assert_eq!(
            drain(&mut rx),
            vec![
                TimerEvent::Display(DisplayText::Time(125)),
                TimerEvent::AnimationStarted,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchers_follow_every_transition() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);
        let mut snapshots = state.watch_snapshot();

        state.start("2").await.unwrap();
        assert!(snapshots.has_changed().unwrap());
        assert_eq!(snapshots.borrow_and_update().state, TimerState::Running);

        state.pause_resume();
        assert_eq!(snapshots.borrow_and_update().state, TimerState::Paused);
        state.pause_resume();

        snapshots.changed().await.unwrap();
        sleep(Duration::from_millis(2500)).await;
        let last = snapshots.borrow_and_update().clone();
        assert_eq!(last.state, TimerState::Expired);
        assert_eq!(last.remaining_seconds, 0);

        state.reset();
        assert_eq!(snapshots.borrow().state, TimerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_is_noop() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);

        state.start("10").await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        let before = state.snapshot();
        assert_eq!(before.remaining_seconds, 9);

        assert_eq!(state.start("00:05:00").await.unwrap(), StartOutcome::AlreadyRunning);
        let after = state.snapshot();
        assert_eq!(after, before);
        assert_eq!(saved(&dir), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_while_paused_keeps_paused_session() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);

        state.start("10").await.unwrap();
        sleep(Duration::from_millis(2500)).await;
        state.pause_resume();
        let before = state.snapshot();
        assert_eq!(before.state, TimerState::Paused);
        assert_eq!(before.remaining_seconds, 8);
        let mut rx = state.subscribe();

        assert_eq!(state.start("5").await.unwrap(), StartOutcome::AlreadyRunning);
        assert_eq!(state.snapshot(), before);
        assert_eq!(saved(&dir), 10);
        assert!(drain(&mut rx).is_empty());

        // The original loop still owns the session after resuming
        state.pause_resume();
        sleep(Duration::from_millis(1200)).await;
        assert_eq!(state.snapshot().session_id, before.session_id);
        assert_eq!(state.snapshot().remaining_seconds, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_failure_does_not_stop_start() {
        let dir = TempDir::new().unwrap();
        let store = LastTimerStore::new(dir.path().join("missing-dir").join("last_timer.json"));
        let state = Arc::new(AppState::new(store));

        assert!(matches!(state.start("3").await, Ok(StartOutcome::Started { .. })));
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(state.snapshot().remaining_seconds, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_when_idle_shows_invalid() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);
        let mut rx = state.subscribe();

        for text in ["00:00:00", "00:00:-1", "soon"] {
            assert!(matches!(state.start(text).await, Err(TimerError::InvalidDuration(_))));
            assert_eq!(state.snapshot().state, TimerState::Idle);
        }

        assert_eq!(drain(&mut rx), vec![TimerEvent::Display(DisplayText::Invalid); 3]);
        assert!(!dir.path().join("last_timer.json").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_input_during_session_leaves_display() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);
        state.start("30").await.unwrap();
        let mut rx = state.subscribe();
        let before = state.snapshot();

        assert!(state.start("00:00:00").await.is_err());

        assert_eq!(state.snapshot(), before);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_three_ticks_with_single_alarm() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);
        let mut rx = state.subscribe();

        state.start("3").await.unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(state.snapshot().state, TimerState::Running);
        assert_eq!(state.snapshot().remaining_seconds, 1);

        sleep(Duration::from_secs(5)).await;
        let snapshot = state.snapshot();
        assert_eq!(snapshot.state, TimerState::Expired);
        assert_eq!(snapshot.remaining_seconds, 0);

        let events = drain(&mut rx);
        let displays: Vec<DisplayText> = events
            .iter()
            .filter_map(|e| match e {
                TimerEvent::Display(text) => Some(*text),
                _ => None,
            })
            .collect();
        assert_eq!(
            displays,
            vec![
                DisplayText::Time(3),
                DisplayText::Time(2),
                DisplayText::Time(1),
                DisplayText::TimesUp,
            ]
        );
        assert_eq!(events.iter().filter(|e| **e == TimerEvent::Alarm).count(), 1);
        assert_eq!(events.last(), Some(&TimerEvent::Alarm));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_withholds_ticks() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);

        state.start("10").await.unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(state.snapshot().remaining_seconds, 8);

        assert_eq!(state.pause_resume(), Some(TimerState::Paused));
        sleep(Duration::from_secs(5)).await;
        assert_eq!(state.snapshot().remaining_seconds, 8);

        assert_eq!(state.pause_resume(), Some(TimerState::Running));
        sleep(Duration::from_millis(1200)).await;
        assert_eq!(state.snapshot().remaining_seconds, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_ticks_while_paused_do_not_decrement() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);

        state.start("10").await.unwrap();
        state.pause_resume();

        assert_eq!(state.on_tick(1), TickOutcome::Held);
        assert_eq!(state.on_tick(0), TickOutcome::Stale);
        assert_eq!(state.snapshot().remaining_seconds, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_countdown() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);

        state.start("10").await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        let mut rx = state.subscribe();

        state.reset();
        let snapshot = state.snapshot();
        assert_eq!(snapshot.state, TimerState::Idle);
        assert_eq!(snapshot.remaining_seconds, 0);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(state.snapshot().remaining_seconds, 0);
        assert_eq!(
            drain(&mut rx),
            vec![
                TimerEvent::Display(DisplayText::Time(0)),
                TimerEvent::AnimationStopped,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_from_idle_and_expired() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);

        state.reset();
        assert_eq!(state.snapshot().state, TimerState::Idle);

        state.start("1").await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(state.snapshot().state, TimerState::Expired);
        assert_eq!(state.pause_resume(), None);

        state.reset();
        assert_eq!(state.snapshot().state, TimerState::Idle);
        assert_eq!(state.snapshot().remaining_seconds, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_reset_ignores_old_loop() {
        let dir = TempDir::new().unwrap();
        let state = new_state(&dir);

        state.start("10").await.unwrap();
        sleep(Duration::from_millis(1500)).await;
        state.reset();
        state.start("5").await.unwrap();

        sleep(Duration::from_millis(2200)).await;
        let snapshot = state.snapshot();
        assert_eq!(snapshot.session_id, 2);
        assert_eq!(snapshot.remaining_seconds, 3);
        assert_eq!(state.session_state(1), None);
    }
}
