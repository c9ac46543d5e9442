//! Audio-output adapter module.
//!
//! [`AudioPlayer`] is the seam between the playback state machine and the
//! audio backend. The backend offers no completion callback — the state
//! machine discovers the end of playback by polling [`is_busy`].
//!
//! [`RodioPlayer`] is the production implementation; [`MockPlayer`]
//! (test-only) records every call so tests can check the single-loaded-
//! artifact invariant against the call log.
//!
//! [`is_busy`]: AudioPlayer::is_busy

pub mod backend;

pub use backend::RodioPlayer;

use std::path::Path;

use thiserror::Error;

// ---------------------------------------------------------------------------
// PlayerError
// ---------------------------------------------------------------------------

/// All errors that can surface from the audio backend.
#[derive(Debug, Clone, Error)]
pub enum PlayerError {
    /// No audio output device could be opened.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The artifact file could not be opened or decoded.
    #[error("cannot load audio artifact: {0}")]
    Load(String),

    /// The playback thread is gone.
    #[error("audio backend disconnected")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// AudioPlayer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface to the audio output backend.
///
/// # Contract
///
/// - At most one artifact is loaded at a time; `load` replaces whatever
///   was loaded before. Callers must `stop()` a busy player first (the
///   orchestrator's pre-synthesis step guarantees this).
/// - `load` leaves the artifact paused at position zero; `play` starts it.
/// - `is_busy` is `true` from `load` until the artifact finishes naturally
///   or `stop` is called. A paused player is still busy.
pub trait AudioPlayer: Send + Sync {
    /// Load the artifact at `path`, replacing any previous one.
    fn load(&self, path: &Path) -> Result<(), PlayerError>;
    /// Start (or restart after pause) playback of the loaded artifact.
    fn play(&self) -> Result<(), PlayerError>;
    /// Pause playback, keeping the artifact loaded.
    fn pause(&self);
    /// Resume paused playback.
    fn resume(&self);
    /// Stop playback and unload the artifact.
    fn stop(&self);
    /// Whether an artifact is currently loaded and not yet finished.
    fn is_busy(&self) -> bool;
}

// Compile-time assertion: Box<dyn AudioPlayer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn AudioPlayer>) {}
};

// ---------------------------------------------------------------------------
// MockPlayer  (test-only)
// ---------------------------------------------------------------------------

/// Every observable interaction with the mock backend, in call order.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCall {
    Load(std::path::PathBuf),
    Play,
    Pause,
    Resume,
    Stop,
}

/// Test double with a call log and an externally controllable busy flag.
///
/// Cloning shares the underlying state, so a test can keep one handle for
/// inspection while the component under test holds another behind
/// `Arc<dyn AudioPlayer>`.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockPlayer {
    inner: std::sync::Arc<std::sync::Mutex<MockPlayerState>>,
}

#[cfg(test)]
#[derive(Default)]
struct MockPlayerState {
    calls: Vec<PlayerCall>,
    loaded: Option<std::path::PathBuf>,
    busy: bool,
    fail_play: bool,
}

#[cfg(test)]
impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next (and every) `play` call fail.
    pub fn failing_play() -> Self {
        let player = Self::default();
        player.inner.lock().unwrap().fail_play = true;
        player
    }

    /// Simulate the backend finishing the loaded artifact naturally.
    pub fn finish_naturally(&self) {
        let mut st = self.inner.lock().unwrap();
        st.busy = false;
    }

    /// Full call log, in order.
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// The currently loaded artifact, if any.
    pub fn loaded(&self) -> Option<std::path::PathBuf> {
        self.inner.lock().unwrap().loaded.clone()
    }

    /// Count of `Play` calls in the log.
    pub fn play_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| matches!(c, PlayerCall::Play))
            .count()
    }
}

#[cfg(test)]
impl AudioPlayer for MockPlayer {
    fn load(&self, path: &Path) -> Result<(), PlayerError> {
        let mut st = self.inner.lock().unwrap();
        // Loading over a still-busy player would break the single-artifact
        // invariant — make the violation loud in tests.
        assert!(
            !st.busy,
            "MockPlayer: load() while busy — previous artifact not stopped"
        );
        st.calls.push(PlayerCall::Load(path.to_path_buf()));
        st.loaded = Some(path.to_path_buf());
        st.busy = true;
        Ok(())
    }

    fn play(&self) -> Result<(), PlayerError> {
        let mut st = self.inner.lock().unwrap();
        if st.fail_play {
            return Err(PlayerError::DeviceUnavailable("mock".into()));
        }
        st.calls.push(PlayerCall::Play);
        st.busy = st.loaded.is_some();
        Ok(())
    }

    fn pause(&self) {
        self.inner.lock().unwrap().calls.push(PlayerCall::Pause);
    }

    fn resume(&self) {
        self.inner.lock().unwrap().calls.push(PlayerCall::Resume);
    }

    fn stop(&self) {
        let mut st = self.inner.lock().unwrap();
        st.calls.push(PlayerCall::Stop);
        st.loaded = None;
        st.busy = false;
    }

    fn is_busy(&self) -> bool {
        self.inner.lock().unwrap().busy
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
