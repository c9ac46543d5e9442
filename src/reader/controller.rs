//! The continuous reading event loop.
//!
//! [`ContinuousReader`] consumes [`FrontendEvent`]s from one channel and
//! emits [`CoreEvent`]s on another. Between front-end events it drives the
//! page cycle: capture → pipeline → poll playback to completion → click
//! the next-page control → settle → capture again.
//!
//! Cancellation is cooperative. A stop request flips the session's active
//! flag; the capture loop, the playback poll and the settle wait each check
//! it (or receive the event directly via `select!`) and wind down at the
//! next checkpoint. A pipeline run that is already past capture finishes
//! its OCR/synthesis undisturbed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::automation::PageAdvancer;
use crate::capture::ScreenCapture;
use crate::config::AppConfig;
use crate::events::{CoreEvent, FrontendEvent};
use crate::pipeline::{PipelineError, PipelineOrchestrator};
use crate::playback::{PlaybackState, SharedPlayback};
use crate::reader::{ContinuousSession, ReaderError, ReaderState};

// ---------------------------------------------------------------------------
// ContinuousReader
// ---------------------------------------------------------------------------

/// Drives continuous reading sessions over a pair of event channels.
///
/// The configuration is snapshotted at construction; edits to the settings
/// file while a session runs do not affect it. The orchestrator passed in
/// should share the same [`CoreEvent`] channel so the front-end sees
/// progress and state changes from both layers in one stream.
pub struct ContinuousReader {
    pipeline: Arc<PipelineOrchestrator>,
    capture: Arc<dyn ScreenCapture>,
    advancer: Arc<dyn PageAdvancer>,
    playback: SharedPlayback,
    config: AppConfig,
    events_tx: mpsc::Sender<CoreEvent>,
    frontend_rx: mpsc::Receiver<FrontendEvent>,
    state: ReaderState,
    session: ContinuousSession,
    restart_requested: bool,
}

impl ContinuousReader {
    pub fn new(
        pipeline: Arc<PipelineOrchestrator>,
        capture: Arc<dyn ScreenCapture>,
        advancer: Arc<dyn PageAdvancer>,
        config: AppConfig,
        events_tx: mpsc::Sender<CoreEvent>,
        frontend_rx: mpsc::Receiver<FrontendEvent>,
    ) -> Self {
        let playback = pipeline.playback();
        Self {
            pipeline,
            capture,
            advancer,
            playback,
            config,
            events_tx,
            frontend_rx,
            state: ReaderState::Idle,
            session: ContinuousSession::default(),
            restart_requested: false,
        }
    }

    /// Current controller state (mainly for tests and status display).
    pub fn state(&self) -> ReaderState {
        self.state
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    /// Run until the front-end channel closes.
    pub async fn run(mut self) {
        while let Some(event) = self.frontend_rx.recv().await {
            self.dispatch(event).await;
        }
        log::debug!("reader: front-end channel closed, shutting down");
        self.playback.lock().unwrap().stop();
        self.sweep_audio_artifacts();
    }

    async fn dispatch(&mut self, event: FrontendEvent) {
        match (self.state, event) {
            // A start request is honored from any state the outer loop can
            // be in; restarting during selection simply re-prompts.
            (_, FrontendEvent::StartContinuous) => {
                self.begin_configuration().await;
            }

            (ReaderState::AwaitingRegion, FrontendEvent::RegionSelected(region)) => {
                if region.is_empty() {
                    self.emit(CoreEvent::Error(
                        ReaderError::Configuration("capture region is empty").to_string(),
                    ))
                    .await;
                    self.end_configuration().await;
                    return;
                }
                self.session.region = Some(region);
                self.set_state(ReaderState::AwaitingClickPoint);
                self.emit(CoreEvent::SelectPoint).await;
            }

            (ReaderState::AwaitingClickPoint, FrontendEvent::PointSelected(point)) => {
                self.session.click_point = Some(point);
                self.session.active = true;
                self.read_session().await;
                self.finish_session().await;
            }

            (
                ReaderState::AwaitingRegion | ReaderState::AwaitingClickPoint,
                FrontendEvent::Cancelled,
            ) => {
                log::info!("reader: selection cancelled");
                self.end_configuration().await;
            }

            // Playback commands outside a reading session act on whatever
            // artifact is still loaded (e.g. after a single capture).
            (_, FrontendEvent::Pause) => self.command_pause().await,
            (_, FrontendEvent::Resume) => self.command_resume().await,
            (_, FrontendEvent::Restart) => self.command_restart().await,

            (_, FrontendEvent::Stop) => {
                if self.stop_playback() {
                    self.emit(CoreEvent::StateChanged(PlaybackState::Stopped)).await;
                }
            }

            (state, event) => {
                log::debug!("reader: ignoring {event:?} in state {state:?}");
            }
        }
    }

    async fn begin_configuration(&mut self) {
        // Deactivate any leftover session before re-prompting so a stale
        // click point is never used against a new region.
        self.session.clear();
        self.playback.lock().unwrap().stop();
        self.set_state(ReaderState::AwaitingRegion);
        self.emit(CoreEvent::SelectRegion).await;
    }

    async fn end_configuration(&mut self) {
        self.session.clear();
        self.set_state(ReaderState::Idle);
        self.emit(CoreEvent::SessionEnded).await;
    }

    async fn finish_session(&mut self) {
        self.session.active = false;
        if self.stop_playback() {
            self.emit(CoreEvent::StateChanged(PlaybackState::Stopped)).await;
        }
        self.sweep_audio_artifacts();
        self.set_state(ReaderState::Stopped);
        self.emit(CoreEvent::SessionEnded).await;

        if self.restart_requested {
            self.restart_requested = false;
            self.begin_configuration().await;
        }
    }

    // -----------------------------------------------------------------------
    // Reading loop
    // -----------------------------------------------------------------------

    /// The page cycle. Returns when the session is deactivated or a fatal
    /// (for this session) error occurs.
    async fn read_session(&mut self) {
        let (region, point) = match (self.session.region, self.session.click_point) {
            (Some(region), Some(point)) => (region, point),
            (None, _) => {
                self.emit(CoreEvent::Error(
                    ReaderError::Configuration("no capture region").to_string(),
                ))
                .await;
                return;
            }
            (_, None) => {
                self.emit(CoreEvent::Error(
                    ReaderError::Configuration("no click point").to_string(),
                ))
                .await;
                return;
            }
        };

        log::info!(
            "reader: session started, region ({}, {}) {}x{}, advance at ({}, {})",
            region.x,
            region.y,
            region.width,
            region.height,
            point.x,
            point.y
        );

        while self.session.active {
            self.set_state(ReaderState::Reading);

            // ── Capture ──────────────────────────────────────────────────
            let capture = Arc::clone(&self.capture);
            let grab = tokio::task::spawn_blocking(move || capture.grab(region)).await;
            let image = match grab {
                Ok(Ok(path)) => path,
                Ok(Err(e)) => {
                    self.emit(CoreEvent::Error(e.to_string())).await;
                    break;
                }
                Err(e) => {
                    self.emit(CoreEvent::Error(e.to_string())).await;
                    break;
                }
            };

            // ── Pipeline + playback ──────────────────────────────────────
            match self.pipeline.run(&image).await {
                Ok(text) => {
                    self.emit(CoreEvent::PageRead {
                        chars: text.flattened().chars().count(),
                    })
                    .await;
                    if !self.await_playback_finished().await {
                        break;
                    }
                }
                Err(PipelineError::EmptyText) => {
                    // A blank page means we overshot or hit a filler page;
                    // advancing immediately is the recovery.
                    log::info!("reader: blank page, advancing without playback");
                }
                Err(e) => {
                    log::warn!("reader: pipeline failed, ending session ({e})");
                    self.emit(CoreEvent::Error(e.to_string())).await;
                    break;
                }
            }

            self.drain_pending_events();
            if !self.session.active {
                break;
            }

            // ── Advance ──────────────────────────────────────────────────
            self.session.awaiting_advance = true;
            self.set_state(ReaderState::AwaitingAdvance);
            if let Err(e) = self.advancer.click(point) {
                self.session.awaiting_advance = false;
                self.emit(CoreEvent::Error(e.to_string())).await;
                break;
            }
            let keep_going = self.settle().await;
            self.session.awaiting_advance = false;
            if !keep_going {
                break;
            }
        }
    }

    /// Poll playback until the artifact finishes naturally.
    ///
    /// Returns `false` when the session was deactivated instead (stop
    /// request, restart request, or channel closure).
    async fn await_playback_finished(&mut self) -> bool {
        let poll = Duration::from_millis(self.config.playback.poll_interval_ms);
        loop {
            tokio::select! {
                event = self.frontend_rx.recv() => {
                    match event {
                        Some(FrontendEvent::Pause) => self.command_pause().await,
                        Some(FrontendEvent::Resume) => self.command_resume().await,
                        Some(FrontendEvent::Restart) => self.command_restart().await,
                        Some(FrontendEvent::StartContinuous) => {
                            self.session.active = false;
                            self.restart_requested = true;
                            return false;
                        }
                        Some(FrontendEvent::Stop) | None => {
                            self.session.active = false;
                            return false;
                        }
                        Some(other) => {
                            log::debug!("reader: ignoring {other:?} while reading");
                        }
                    }
                }
                _ = tokio::time::sleep(poll) => {
                    let state = self.playback.lock().unwrap().poll();
                    if state == PlaybackState::Finished {
                        self.emit(CoreEvent::StateChanged(PlaybackState::Finished)).await;
                        return true;
                    }
                }
            }
        }
    }

    /// Wait out the post-click settle delay, still listening for events.
    ///
    /// Returns `false` when the session was deactivated mid-wait; the
    /// pending advance then becomes a no-op and nothing more is captured.
    async fn settle(&mut self) -> bool {
        let deadline = Instant::now() + Duration::from_millis(self.config.reader.settle_delay_ms);
        loop {
            tokio::select! {
                event = self.frontend_rx.recv() => {
                    match event {
                        Some(FrontendEvent::StartContinuous) => {
                            self.session.active = false;
                            self.restart_requested = true;
                            return false;
                        }
                        Some(FrontendEvent::Stop) | None => {
                            self.session.active = false;
                            return false;
                        }
                        Some(other) => {
                            log::debug!("reader: ignoring {other:?} during settle");
                        }
                    }
                }
                _ = tokio::time::sleep_until(deadline) => {
                    return self.session.active;
                }
            }
        }
    }

    /// Apply front-end events that queued up while capture/OCR ran.
    ///
    /// A blank page reaches the advance click without passing through any
    /// `recv` point, so a stop sent during the recognition run would
    /// otherwise go unseen until after the click has landed.
    fn drain_pending_events(&mut self) {
        while let Ok(event) = self.frontend_rx.try_recv() {
            match event {
                FrontendEvent::Stop => self.session.active = false,
                FrontendEvent::StartContinuous => {
                    self.session.active = false;
                    self.restart_requested = true;
                }
                other => log::debug!("reader: ignoring {other:?} before advance"),
            }
        }
    }

    /// Stop playback; returns `true` when the machine actually left a
    /// non-Stopped state (so callers report only real transitions).
    fn stop_playback(&self) -> bool {
        let mut playback = self.playback.lock().unwrap();
        let was_stopped = playback.state() == PlaybackState::Stopped;
        playback.stop();
        !was_stopped
    }

    /// Delete the audio artifacts left behind by the session that ended.
    fn sweep_audio_artifacts(&self) {
        match self.pipeline.paths().clean_audio_artifacts() {
            Ok(0) => {}
            Ok(removed) => log::info!("reader: removed {removed} stale audio artifacts"),
            Err(e) => log::warn!("reader: audio artifact sweep failed: {e}"),
        }
    }

    // -----------------------------------------------------------------------
    // Playback commands
    // -----------------------------------------------------------------------

    async fn command_pause(&mut self) {
        let state = {
            let mut playback = self.playback.lock().unwrap();
            playback.pause();
            playback.state()
        };
        self.emit(CoreEvent::StateChanged(state)).await;
    }

    async fn command_resume(&mut self) {
        let state = {
            let mut playback = self.playback.lock().unwrap();
            playback.resume();
            playback.state()
        };
        self.emit(CoreEvent::StateChanged(state)).await;
    }

    async fn command_restart(&mut self) {
        let state = {
            let mut playback = self.playback.lock().unwrap();
            playback.restart();
            playback.state()
        };
        self.emit(CoreEvent::StateChanged(state)).await;
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn set_state(&mut self, next: ReaderState) {
        if self.state != next {
            log::debug!("reader: {:?} → {:?}", self.state, next);
            self.state = next;
        }
    }

    async fn emit(&self, event: CoreEvent) {
        // The front-end going away must never stall the reader.
        let _ = self.events_tx.send(event).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::MockClicker;
    use crate::capture::{MockCapture, Point, Region};
    use crate::config::AppPaths;
    use crate::ocr::MockOcrEngine;
    use crate::playback::new_shared_playback;
    use crate::player::{AudioPlayer, MockPlayer, PlayerCall};
    use crate::tts::MockTtsEngine;
    use tempfile::TempDir;

    const REGION: Region = Region {
        x: 0,
        y: 0,
        width: 800,
        height: 600,
    };
    const POINT: Point = Point { x: 750, y: 580 };

    struct Harness {
        tx: mpsc::Sender<FrontendEvent>,
        rx: mpsc::Receiver<CoreEvent>,
        player: MockPlayer,
        clicker: MockClicker,
        capture: Arc<MockCapture>,
        audio_dir: std::path::PathBuf,
        log: Vec<CoreEvent>,
        _dir: TempDir,
    }

    fn spawn_reader(ocr: MockOcrEngine, tts: MockTtsEngine, config: AppConfig) -> Harness {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = TempDir::new().expect("temp dir");
        let paths = AppPaths::rooted_at(dir.path());
        let audio_dir = paths.audio_dir.clone();
        let player = MockPlayer::new();
        let playback = new_shared_playback(Arc::new(player.clone()));
        let clicker = MockClicker::new();
        let capture = Arc::new(MockCapture::new(dir.path().join("snip.png")));

        let (frontend_tx, frontend_rx) = mpsc::channel(16);
        let (core_tx, core_rx) = mpsc::channel(64);

        let pipeline = Arc::new(
            PipelineOrchestrator::new(
                Arc::new(ocr),
                Arc::new(tts),
                playback,
                config.clone(),
                paths,
            )
            .with_events(core_tx.clone()),
        );

        let reader = ContinuousReader::new(
            pipeline,
            Arc::clone(&capture) as Arc<dyn ScreenCapture>,
            Arc::new(clicker.clone()),
            config,
            core_tx,
            frontend_rx,
        );
        tokio::spawn(reader.run());

        Harness {
            tx: frontend_tx,
            rx: core_rx,
            player,
            clicker,
            capture,
            audio_dir,
            log: Vec::new(),
            _dir: dir,
        }
    }

    fn audio_artifact_count(dir: &std::path::Path) -> usize {
        std::fs::read_dir(dir)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.file_name().to_string_lossy().starts_with("tts_"))
                    .count()
            })
            .unwrap_or(0)
    }

    fn fast_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.playback.poll_interval_ms = 5;
        config.playback.teardown_wait_ms = 1;
        config.reader.settle_delay_ms = 20;
        config
    }

    impl Harness {
        async fn send(&self, event: FrontendEvent) {
            self.tx.send(event).await.expect("reader task gone");
        }

        /// Receive (and log) events until one matches the predicate.
        async fn wait_for(&mut self, what: &str, pred: impl Fn(&CoreEvent) -> bool) -> CoreEvent {
            loop {
                let event = tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
                    .await
                    .unwrap_or_else(|_| panic!("timed out waiting for {what}"))
                    .expect("core event channel closed");
                self.log.push(event.clone());
                if pred(&event) {
                    return event;
                }
            }
        }

        /// Poll a mock-side condition with a bounded wait.
        async fn wait_until(&self, what: &str, pred: impl Fn() -> bool) {
            for _ in 0..1000 {
                if pred() {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            panic!("timed out waiting until {what}");
        }

        /// The sequence of playback states observed so far, starting from
        /// the machine's initial state.
        fn state_sequence(&self) -> Vec<PlaybackState> {
            let mut seq = vec![PlaybackState::default()];
            for event in &self.log {
                if let CoreEvent::StateChanged(s) = event {
                    if seq.last() != Some(s) {
                        seq.push(*s);
                    }
                }
            }
            seq
        }
    }

    // ---- full two-page continuous scenario ----

    #[tokio::test]
    async fn continuous_session_reads_two_pages_with_one_click_between() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(["첫 페이지 내용"]),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;

        h.send(FrontendEvent::RegionSelected(REGION)).await;
        h.wait_for("point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;

        h.send(FrontendEvent::PointSelected(POINT)).await;
        h.wait_for("first page", |e| matches!(e, CoreEvent::PageRead { .. }))
            .await;

        // Page one is playing: one capture, no clicks yet.
        assert_eq!(h.capture.grabs(), vec![REGION]);
        assert!(h.clicker.clicks().is_empty());
        assert!(h.player.is_busy());

        // The artifact runs out; the reader must click exactly once and
        // re-capture the same region.
        h.player.finish_naturally();
        h.wait_for("second page", |e| matches!(e, CoreEvent::PageRead { .. }))
            .await;

        assert_eq!(h.clicker.clicks(), vec![POINT]);
        assert_eq!(h.capture.grabs(), vec![REGION, REGION]);

        h.send(FrontendEvent::Stop).await;
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;

        assert_eq!(
            h.state_sequence(),
            vec![
                PlaybackState::Stopped,
                PlaybackState::Playing,
                PlaybackState::Finished,
                PlaybackState::Playing,
                PlaybackState::Stopped,
            ]
        );
        // No further advance after the stop.
        assert_eq!(h.clicker.clicks().len(), 1);
        assert_eq!(h.capture.grabs().len(), 2);
    }

    // ---- cancellation during the settle delay ----

    #[tokio::test]
    async fn stop_during_settle_delay_cancels_pending_advance() {
        let mut config = fast_config();
        config.reader.settle_delay_ms = 60_000; // session should never wait this out

        let mut h = spawn_reader(
            MockOcrEngine::ok(["페이지"]),
            MockTtsEngine::ok(),
            config,
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::RegionSelected(REGION)).await;
        h.wait_for("point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;
        h.send(FrontendEvent::PointSelected(POINT)).await;
        h.wait_for("first page", |e| matches!(e, CoreEvent::PageRead { .. }))
            .await;

        h.player.finish_naturally();
        // The click fires, then the long settle wait begins.
        let clicker = h.clicker.clone();
        h.wait_until("the advance click", move || clicker.clicks().len() == 1)
            .await;

        h.send(FrontendEvent::Stop).await;
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;

        // The deactivated session captured nothing further and the
        // session ended with exactly one terminal transition.
        assert_eq!(h.capture.grabs().len(), 1);
        let stops = h
            .log
            .iter()
            .filter(|e| matches!(e, CoreEvent::StateChanged(PlaybackState::Stopped)))
            .count();
        assert_eq!(stops, 1);
    }

    // ---- artifact sweep at session end ----

    #[tokio::test]
    async fn session_end_sweeps_audio_artifacts() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(["페이지"]),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::RegionSelected(REGION)).await;
        h.wait_for("point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;
        h.send(FrontendEvent::PointSelected(POINT)).await;
        h.wait_for("first page", |e| matches!(e, CoreEvent::PageRead { .. }))
            .await;

        assert_eq!(audio_artifact_count(&h.audio_dir), 1);

        h.send(FrontendEvent::Stop).await;
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;

        // The session's audio files do not survive it.
        assert_eq!(audio_artifact_count(&h.audio_dir), 0);
    }

    // ---- blank pages ----

    #[tokio::test]
    async fn blank_pages_advance_without_playing() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(Vec::<String>::new()),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::RegionSelected(REGION)).await;
        h.wait_for("point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;
        h.send(FrontendEvent::PointSelected(POINT)).await;

        let clicker = h.clicker.clone();
        h.wait_until("two blank-page advances", move || clicker.clicks().len() >= 2)
            .await;

        h.send(FrontendEvent::Stop).await;
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;

        // Blank pages never reach the player.
        assert!(!h
            .player
            .calls()
            .iter()
            .any(|c| matches!(c, PlayerCall::Load(_) | PlayerCall::Play)));
        assert!(h.capture.grabs().len() >= 2);
    }

    #[tokio::test]
    async fn stop_during_blank_page_recognition_cancels_the_advance() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(Vec::<String>::new()).with_delay(Duration::from_millis(300)),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::RegionSelected(REGION)).await;
        h.wait_for("point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;
        h.send(FrontendEvent::PointSelected(POINT)).await;

        // The capture happened; recognition is still in flight for a while.
        let capture = Arc::clone(&h.capture);
        h.wait_until("the first capture", move || capture.grabs().len() == 1)
            .await;
        h.send(FrontendEvent::Stop).await;

        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;

        // The stop queued during recognition beats the blank-page advance:
        // no click lands after the user stopped, and nothing more is
        // captured.
        assert!(h.clicker.clicks().is_empty());
        assert_eq!(h.capture.grabs().len(), 1);
    }

    // ---- errors end the session ----

    #[tokio::test]
    async fn synthesis_failure_ends_the_session() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(["text"]),
            MockTtsEngine::failing(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::RegionSelected(REGION)).await;
        h.wait_for("point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;
        h.send(FrontendEvent::PointSelected(POINT)).await;

        h.wait_for("error event", |e| matches!(e, CoreEvent::Error(_)))
            .await;
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;

        // No retry spin: a single capture, no click, no playback.
        assert_eq!(h.capture.grabs().len(), 1);
        assert!(h.clicker.clicks().is_empty());
        assert_eq!(h.player.play_count(), 0);
        // Playback never began, so no state transition is reported either.
        assert!(!h
            .log
            .iter()
            .any(|e| matches!(e, CoreEvent::StateChanged(_))));
    }

    #[tokio::test]
    async fn stop_while_idle_reports_no_transition() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(["text"]),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::Stop).await;
        // A later prompt proves the stop was processed in between.
        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;

        assert!(!h
            .log
            .iter()
            .any(|e| matches!(e, CoreEvent::StateChanged(_))));
    }

    // ---- cancelling modal selection ----

    #[tokio::test]
    async fn cancelled_selection_returns_to_idle_and_allows_restart() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(["text"]),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::Cancelled).await;
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;

        assert!(h.capture.grabs().is_empty());

        // Starting over works from the cancelled state.
        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("second region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
    }

    #[tokio::test]
    async fn empty_region_is_rejected_as_configuration_error() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(["text"]),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::RegionSelected(Region::new(10, 10, 0, 50)))
            .await;

        let error = h
            .wait_for("configuration error", |e| matches!(e, CoreEvent::Error(_)))
            .await;
        if let CoreEvent::Error(message) = error {
            assert!(message.contains("region"));
        }
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;
        assert!(h.capture.grabs().is_empty());
    }

    // ---- restart while a session is running ----

    #[tokio::test]
    async fn restarting_mid_session_reprompts_and_uses_new_configuration() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(["페이지"]),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::RegionSelected(REGION)).await;
        h.wait_for("point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;
        h.send(FrontendEvent::PointSelected(POINT)).await;
        h.wait_for("first page", |e| matches!(e, CoreEvent::PageRead { .. }))
            .await;

        // Start over while page one is still playing: the old session must
        // end first and the prompts must come again.
        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("old session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;
        h.wait_for("new region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;

        let new_region = Region::new(100, 100, 400, 300);
        let new_point = Point::new(480, 390);
        h.send(FrontendEvent::RegionSelected(new_region)).await;
        h.wait_for("new point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;
        h.send(FrontendEvent::PointSelected(new_point)).await;
        h.wait_for("new first page", |e| matches!(e, CoreEvent::PageRead { .. }))
            .await;

        // The new session captures the new region.
        assert_eq!(h.capture.grabs(), vec![REGION, new_region]);
        // The old click point was never used.
        assert!(h.clicker.clicks().is_empty());

        // And when the new session advances, it clicks the new point.
        h.player.finish_naturally();
        let clicker = h.clicker.clone();
        h.wait_until("the new advance click", move || clicker.clicks().len() == 1)
            .await;
        assert_eq!(h.clicker.clicks(), vec![new_point]);

        h.send(FrontendEvent::Stop).await;
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;
    }

    // ---- pause / resume mid-page ----

    #[tokio::test]
    async fn pause_and_resume_while_a_page_is_playing() {
        let mut h = spawn_reader(
            MockOcrEngine::ok(["페이지"]),
            MockTtsEngine::ok(),
            fast_config(),
        );

        h.send(FrontendEvent::StartContinuous).await;
        h.wait_for("region prompt", |e| matches!(e, CoreEvent::SelectRegion))
            .await;
        h.send(FrontendEvent::RegionSelected(REGION)).await;
        h.wait_for("point prompt", |e| matches!(e, CoreEvent::SelectPoint))
            .await;
        h.send(FrontendEvent::PointSelected(POINT)).await;
        h.wait_for("first page", |e| matches!(e, CoreEvent::PageRead { .. }))
            .await;

        h.send(FrontendEvent::Pause).await;
        h.wait_for("paused", |e| {
            matches!(e, CoreEvent::StateChanged(PlaybackState::Paused))
        })
        .await;

        // A paused session never advances, even though the poll keeps
        // ticking.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(h.clicker.clicks().is_empty());

        h.send(FrontendEvent::Resume).await;
        h.wait_for("resumed", |e| {
            matches!(e, CoreEvent::StateChanged(PlaybackState::Playing))
        })
        .await;

        h.player.finish_naturally();
        h.wait_for("second page", |e| matches!(e, CoreEvent::PageRead { .. }))
            .await;
        assert_eq!(h.clicker.clicks().len(), 1);

        h.send(FrontendEvent::Stop).await;
        h.wait_for("session end", |e| matches!(e, CoreEvent::SessionEnded))
            .await;
    }
}
