//! Continuous reading controller.
//!
//! # Session lifecycle
//!
//! ```text
//! Idle ──start──▶ AwaitingRegion ──region──▶ AwaitingClickPoint
//!                       │                          │
//!                    cancel                     point
//!                       ▼                          ▼
//!                     Idle                      Reading ◀────────┐
//!                                                  │             │
//!                                   playback Finished (or blank  │
//!                                   page) → click next-page      │
//!                                                  ▼             │
//!                                          AwaitingAdvance ──settle
//!
//! stop (from any state) ──▶ Stopped
//! ```
//!
//! The controller owns no timers of its own beyond the playback poll tick
//! and the post-click settle delay. Cancellation is cooperative: a stop
//! request deactivates the session, and in-flight waits notice at their
//! next checkpoint. OCR and synthesis are never interrupted mid-call.

pub mod controller;

pub use controller::ContinuousReader;

use thiserror::Error;

use crate::capture::{Point, Region};

// ---------------------------------------------------------------------------
// ReaderState
// ---------------------------------------------------------------------------

/// Lifecycle states of the continuous reading controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReaderState {
    /// No session; waiting for a start request.
    #[default]
    Idle,
    /// Session starting; the front-end was asked for the capture region.
    AwaitingRegion,
    /// Region known; the front-end was asked for the next-page click point.
    AwaitingClickPoint,
    /// A page is being captured, recognized, synthesized or played.
    Reading,
    /// The next-page click was issued; waiting out the settle delay.
    AwaitingAdvance,
    /// The session ended (stopped, cancelled or failed). A new start
    /// request is accepted from here exactly as from Idle.
    Stopped,
}

// ---------------------------------------------------------------------------
// ReaderError
// ---------------------------------------------------------------------------

/// Errors owned by the controller itself (adapter errors surface through
/// [`crate::pipeline::PipelineError`] instead).
#[derive(Debug, Clone, Error)]
pub enum ReaderError {
    /// Reading was about to start without a usable region or click point.
    /// Fatal to the session only; the controller returns to Idle.
    #[error("continuous session not configured: {0}")]
    Configuration(&'static str),
}

// ---------------------------------------------------------------------------
// ContinuousSession
// ---------------------------------------------------------------------------

/// Per-session configuration and liveness flags.
///
/// `region` and `click_point` are fixed once reading begins; a session is
/// never re-pointed mid-flight. Restarting goes through a full re-prompt so
/// a stale click point can never be used against a new region.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinuousSession {
    pub region: Option<Region>,
    pub click_point: Option<Point>,
    /// While `false`, no automatic advance may happen, regardless of any
    /// timer still in flight.
    pub active: bool,
    /// Guards against re-entrant advances while a settle delay runs.
    pub awaiting_advance: bool,
}

impl ContinuousSession {
    /// Discard all configuration and deactivate.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        assert_eq!(ReaderState::default(), ReaderState::Idle);
    }

    #[test]
    fn clear_drops_configuration_and_deactivates() {
        let mut session = ContinuousSession {
            region: Some(Region::new(0, 0, 800, 600)),
            click_point: Some(Point::new(750, 580)),
            active: true,
            awaiting_advance: true,
        };
        session.clear();
        assert!(session.region.is_none());
        assert!(session.click_point.is_none());
        assert!(!session.active);
        assert!(!session.awaiting_advance);
    }
}
