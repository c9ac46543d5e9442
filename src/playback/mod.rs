//! Playback state machine — the single source of truth for audio state.
//!
//! [`PlaybackState`] is the canonical lifecycle of one audio artifact:
//!
//! ```text
//! Stopped ──begin──▶ Playing ──pause──▶ Paused ──resume──▶ Playing
//!                     │  ▲                │
//!                     │  └───restart──────┘
//!                     │
//!                     └──poll sees idle──▶ Finished
//! any non-Stopped ──stop──▶ Stopped
//! ```
//!
//! `Finished` is reachable **only** by natural completion, never by an
//! explicit stop — the continuous reader uses that distinction to tell
//! "audio ran out, advance the page" apart from "the user stopped us".
//!
//! All mutation of the state and of the current-artifact reference funnels
//! through [`PlaybackStateMachine`] command methods; every other component
//! holds a [`SharedPlayback`] and either issues commands or reads.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::player::{AudioPlayer, PlayerError};

// ---------------------------------------------------------------------------
// PlaybackState
// ---------------------------------------------------------------------------

/// Lifecycle states of the loaded audio artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No artifact loaded; the player is torn down.
    Stopped,
    /// An artifact is loaded and audible.
    Playing,
    /// An artifact is loaded but suspended by the user.
    Paused,
    /// The artifact played to its natural end (backend went idle).
    Finished,
}

impl PlaybackState {
    /// A short human-readable label suitable for display in a status bar.
    pub fn label(&self) -> &'static str {
        match self {
            PlaybackState::Stopped => "Stopped",
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused => "Paused",
            PlaybackState::Finished => "Finished",
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        PlaybackState::Stopped
    }
}

// ---------------------------------------------------------------------------
// PlaybackStateMachine
// ---------------------------------------------------------------------------

/// Owns [`PlaybackState`] and the current-artifact reference.
///
/// Invalid transitions are no-ops, logged at debug — a pause command while
/// Stopped is a UI race, not a bug worth surfacing.
pub struct PlaybackStateMachine {
    state: PlaybackState,
    current_artifact: Option<PathBuf>,
    player: Arc<dyn AudioPlayer>,
}

impl PlaybackStateMachine {
    pub fn new(player: Arc<dyn AudioPlayer>) -> Self {
        Self {
            state: PlaybackState::Stopped,
            current_artifact: None,
            player,
        }
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The artifact currently owned by the player, if any.
    pub fn current_artifact(&self) -> Option<&Path> {
        self.current_artifact.as_deref()
    }

    /// Whether the audio backend still reports busy.
    pub fn player_busy(&self) -> bool {
        self.player.is_busy()
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Load and play a fresh artifact: the transition out of Stopped.
    ///
    /// The orchestrator guarantees the player was stopped (and given time
    /// to tear down) before this is called, so at most one artifact is
    /// ever loaded.
    ///
    /// On load/play failure the machine reverts to Stopped and the error
    /// propagates.
    pub fn begin(&mut self, artifact: &Path) -> Result<(), PlayerError> {
        if let Err(e) = self.player.load(artifact).and_then(|_| self.player.play()) {
            log::warn!("playback: begin failed ({e}), reverting to Stopped");
            self.player.stop();
            self.state = PlaybackState::Stopped;
            self.current_artifact = None;
            return Err(e);
        }

        self.current_artifact = Some(artifact.to_path_buf());
        self.transition(PlaybackState::Playing);
        Ok(())
    }

    /// Pause — valid only from Playing.
    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            log::debug!("playback: pause ignored in state {:?}", self.state);
            return;
        }
        self.player.pause();
        self.transition(PlaybackState::Paused);
    }

    /// Resume — valid only from Paused.
    pub fn resume(&mut self) {
        if self.state != PlaybackState::Paused {
            log::debug!("playback: resume ignored in state {:?}", self.state);
            return;
        }
        self.player.resume();
        self.transition(PlaybackState::Playing);
    }

    /// Restart — valid from any non-Stopped state; replays the current
    /// artifact from the beginning.
    pub fn restart(&mut self) {
        if self.state == PlaybackState::Stopped {
            log::debug!("playback: restart ignored while Stopped");
            return;
        }
        let Some(artifact) = self.current_artifact.clone() else {
            log::debug!("playback: restart ignored, no artifact");
            return;
        };

        self.player.stop();
        if let Err(e) = self.player.load(&artifact).and_then(|_| self.player.play()) {
            log::warn!("playback: restart failed ({e}), reverting to Stopped");
            self.player.stop();
            self.current_artifact = None;
            self.transition(PlaybackState::Stopped);
            return;
        }
        self.transition(PlaybackState::Playing);
    }

    /// Stop — valid from any state; always drives to Stopped and releases
    /// the current-artifact reference.
    ///
    /// Idempotent: stopping an already-Stopped machine is a pure no-op and
    /// does not touch the player.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Stopped {
            log::debug!("playback: stop ignored, already Stopped");
            return;
        }
        self.player.stop();
        self.current_artifact = None;
        self.transition(PlaybackState::Stopped);
    }

    /// Observe the backend: a Playing machine whose player has gone idle
    /// has finished naturally.
    ///
    /// Returns the state after the poll. Never moves to Stopped — only an
    /// explicit stop does that.
    pub fn poll(&mut self) -> PlaybackState {
        if self.state == PlaybackState::Playing && !self.player.is_busy() {
            self.transition(PlaybackState::Finished);
        }
        self.state
    }

    fn transition(&mut self, next: PlaybackState) {
        if self.state != next {
            log::debug!("playback: {:?} → {:?}", self.state, next);
            self.state = next;
        }
    }
}

// ---------------------------------------------------------------------------
// SharedPlayback
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`PlaybackStateMachine`].
///
/// Cheap to clone (`Arc` clone). Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedPlayback = Arc<Mutex<PlaybackStateMachine>>;

/// Construct a new [`SharedPlayback`] around the given player.
pub fn new_shared_playback(player: Arc<dyn AudioPlayer>) -> SharedPlayback {
    Arc::new(Mutex::new(PlaybackStateMachine::new(player)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
