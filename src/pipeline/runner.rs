//! Pipeline orchestrator — drives one full capture → speech cycle.
//!
//! [`PipelineOrchestrator::run`] is invoked once per captured image, either
//! directly (single capture from the toolbar) or repeatedly by the
//! continuous reading controller. It owns no long-running loop itself; it
//! is a strictly sequential procedure with careful teardown of the
//! previous run's audio.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::{AppConfig, AppPaths};
use crate::events::CoreEvent;
use crate::ocr::{OcrEngine, RecognizedText};
use crate::playback::{PlaybackState, SharedPlayback};
use crate::player::PlayerError;
use crate::tts::{select_voice, TtsEngine, TtsError};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Errors that can surface inside one pipeline run.
///
/// All variants are recoverable: they abort the current run only and are
/// surfaced to the front-end as a message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The recognizer failed or produced output of an unexpected shape.
    /// Audio state is untouched.
    #[error("recognition failed: {0}")]
    RecognitionFormat(String),

    /// No usable text after trimming — nothing was synthesized, played or
    /// written. In continuous mode this triggers an automatic advance.
    #[error("no text recognized in the captured region")]
    EmptyText,

    /// The synthesis backend failed; playback state is unchanged.
    #[error(transparent)]
    Synthesis(#[from] TtsError),

    /// Load/play failed; playback state was reverted to Stopped.
    #[error(transparent)]
    Player(#[from] PlayerError),

    /// The working text artifact could not be written.
    #[error("cannot write text artifact: {0}")]
    Io(#[from] std::io::Error),

    /// Internal / unexpected error (e.g. a join failure).
    #[error("internal error: {0}")]
    Internal(String),
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Composes recognizer → language policy → synthesizer → player for one
/// capture, and keeps the playback state machine truthful along the way.
pub struct PipelineOrchestrator {
    ocr: Arc<dyn OcrEngine>,
    tts: Arc<dyn TtsEngine>,
    playback: SharedPlayback,
    config: AppConfig,
    paths: AppPaths,
    events_tx: Option<mpsc::Sender<CoreEvent>>,
    last_text: Mutex<Option<RecognizedText>>,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `ocr`      — recognizer adapter (e.g. `TesseractOcr`).
    /// * `tts`      — synthesizer adapter (e.g. `HttpTtsEngine`).
    /// * `playback` — the shared playback state machine.
    /// * `config`   — voices, teardown wait, OCR settings.
    /// * `paths`    — working-artifact locations.
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        tts: Arc<dyn TtsEngine>,
        playback: SharedPlayback,
        config: AppConfig,
        paths: AppPaths,
    ) -> Self {
        Self {
            ocr,
            tts,
            playback,
            config,
            paths,
            events_tx: None,
            last_text: Mutex::new(None),
        }
    }

    /// Attach a channel for progress / state events to the front-end.
    pub fn with_events(mut self, events_tx: mpsc::Sender<CoreEvent>) -> Self {
        self.events_tx = Some(events_tx);
        self
    }

    /// The most recently recognized text, for external inspection.
    ///
    /// `None` until the first successful recognition.
    pub fn last_text(&self) -> Option<RecognizedText> {
        self.last_text.lock().unwrap().clone()
    }

    /// Handle to the playback state machine this orchestrator feeds.
    pub fn playback(&self) -> SharedPlayback {
        Arc::clone(&self.playback)
    }

    /// Filesystem locations of this orchestrator's working artifacts.
    pub fn paths(&self) -> &AppPaths {
        &self.paths
    }

    // -----------------------------------------------------------------------
    // run
    // -----------------------------------------------------------------------

    /// Execute one full pipeline run on the captured image.
    ///
    /// On success the returned [`RecognizedText`] has also been written to
    /// the session text artifact, a fresh audio artifact is loaded in the
    /// player, and the playback state machine is in `Playing`.
    pub async fn run(&self, image_path: &Path) -> Result<RecognizedText, PipelineError> {
        // ── 1. Recognition (blocking subprocess → thread pool) ───────────
        self.progress(10, "recognizing text").await;

        let ocr = Arc::clone(&self.ocr);
        let image = image_path.to_path_buf();
        let lines = tokio::task::spawn_blocking(move || ocr.recognize(&image))
            .await
            .map_err(|e| PipelineError::Internal(e.to_string()))?
            .map_err(|e| PipelineError::RecognitionFormat(e.to_string()))?;

        // ── 2. Flatten; blank pages short-circuit before any side effect ─
        let text = RecognizedText::from_lines(lines);
        if text.is_blank() {
            log::info!("pipeline: blank capture, skipping synthesis");
            return Err(PipelineError::EmptyText);
        }

        log::debug!(
            "pipeline: recognized {} lines ({} chars)",
            text.lines().len(),
            text.flattened().len()
        );

        // ── 3. Persist the session text artifact (overwrite) ────────────
        if let Some(parent) = self.paths.text_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.paths.text_file, text.flattened()).await?;

        *self.last_text.lock().unwrap() = Some(text.clone());

        // ── 4. Voice selection ───────────────────────────────────────────
        let voice = select_voice(text.flattened(), &self.config.tts).to_string();

        // ── 5. Tear down the previous run's audio before synthesis ──────
        // The old artifact may still be open in the backend; stop it and
        // give the backend a bounded moment before a new file appears.
        let was_busy = {
            let mut playback = self.playback.lock().unwrap();
            let busy = playback.player_busy();
            if busy || playback.state() != PlaybackState::Stopped {
                playback.stop();
            }
            busy
        };
        if was_busy {
            tokio::time::sleep(Duration::from_millis(self.config.playback.teardown_wait_ms))
                .await;
        }

        // ── 6. Synthesis to a fresh, never-reused artifact path ──────────
        self.progress(50, "synthesizing speech").await;

        let artifact = self.paths.unique_audio_path();
        self.tts
            .synthesize(text.flattened(), &voice, &artifact)
            .await?;

        // ── 7. Load + play ───────────────────────────────────────────────
        self.progress(90, "starting playback").await;

        self.playback.lock().unwrap().begin(&artifact)?;
        self.emit(CoreEvent::StateChanged(PlaybackState::Playing)).await;

        Ok(text)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn progress(&self, percent: u8, message: &str) {
        self.emit(CoreEvent::Progress {
            percent,
            message: message.to_string(),
        })
        .await;
    }

    async fn emit(&self, event: CoreEvent) {
        if let Some(tx) = &self.events_tx {
            // The front-end going away must never stall the pipeline.
            let _ = tx.send(event).await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
