//! Event types exchanged with the front-end over `tokio::sync::mpsc`.
//!
//! The core never calls into UI code. The front-end sends
//! [`FrontendEvent`]s (user intent, modal selection results) and receives
//! [`CoreEvent`]s (progress, state changes, errors) — both plain data, so
//! any front-end that can drive two channels can host the core.

use crate::capture::{Point, Region};
use crate::playback::PlaybackState;

// ---------------------------------------------------------------------------
// FrontendEvent  (front-end → core)
// ---------------------------------------------------------------------------

/// Events the front-end feeds into the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendEvent {
    /// Start a continuous-reading session; the core will ask for a region
    /// and a click point before reading begins.
    StartContinuous,
    /// The user confirmed the capture region (modal selection finished).
    RegionSelected(Region),
    /// The user confirmed the "next page" click point.
    PointSelected(Point),
    /// The user cancelled a pending modal selection.
    Cancelled,
    /// Stop the continuous session and all playback.
    Stop,
    /// Pause the current audio.
    Pause,
    /// Resume paused audio.
    Resume,
    /// Replay the current artifact from the beginning.
    Restart,
}

// ---------------------------------------------------------------------------
// CoreEvent  (core → front-end)
// ---------------------------------------------------------------------------

/// Events the core surfaces to the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// The core needs the user to select a capture region (modal).
    SelectRegion,
    /// The core needs the user to select the next-page click point (modal).
    SelectPoint,
    /// Progress of a long-running step (0–100, with a short message).
    Progress { percent: u8, message: String },
    /// The playback state machine changed state.
    StateChanged(PlaybackState),
    /// One page was recognized and queued for playback.
    PageRead { chars: usize },
    /// A recoverable error, already handled; display only.
    Error(String),
    /// The continuous session is over (stopped, cancelled, or failed).
    SessionEnded,
}
