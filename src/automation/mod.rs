//! Pointer automation — the "next page" click, backed by the `enigo` crate.
//!
//! The continuous reader advances a paginated document by clicking a fixed
//! screen coordinate the user selected once at session start. That is the
//! entire surface: one absolute move, one left click.

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use thiserror::Error;

use crate::capture::Point;

// ---------------------------------------------------------------------------
// AutomationError
// ---------------------------------------------------------------------------

/// Errors from the pointer-automation backend.
#[derive(Debug, Clone, Error)]
pub enum AutomationError {
    /// The enigo backend could not be initialised or an event failed to
    /// be delivered.
    #[error("cannot simulate click: {0}")]
    Click(String),
}

// ---------------------------------------------------------------------------
// PageAdvancer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe click capability.
pub trait PageAdvancer: Send + Sync {
    /// Click the left mouse button at the absolute screen coordinate.
    fn click(&self, point: Point) -> Result<(), AutomationError>;
}

// Compile-time assertion: Box<dyn PageAdvancer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn PageAdvancer>) {}
};

// ---------------------------------------------------------------------------
// EnigoClicker
// ---------------------------------------------------------------------------

/// Production clicker.
///
/// A new [`Enigo`] instance is created for each call because `Enigo` is
/// not `Send` and the handle is cheap to construct.
#[derive(Debug, Clone, Default)]
pub struct EnigoClicker;

impl EnigoClicker {
    pub fn new() -> Self {
        Self
    }
}

impl PageAdvancer for EnigoClicker {
    fn click(&self, point: Point) -> Result<(), AutomationError> {
        let mut enigo =
            Enigo::new(&Settings::default()).map_err(|e| AutomationError::Click(e.to_string()))?;

        enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| AutomationError::Click(e.to_string()))?;
        enigo
            .button(Button::Left, Direction::Click)
            .map_err(|e| AutomationError::Click(e.to_string()))?;

        log::debug!("automation: clicked ({}, {})", point.x, point.y);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MockClicker  (test-only)
// ---------------------------------------------------------------------------

/// Test double that records every click.
///
/// Cloning shares the log, so tests can hold one handle while the reader
/// holds another behind `Arc<dyn PageAdvancer>`.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MockClicker {
    clicks: std::sync::Arc<std::sync::Mutex<Vec<Point>>>,
}

#[cfg(test)]
impl MockClicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clicks recorded so far, in order.
    pub fn clicks(&self) -> Vec<Point> {
        self.clicks.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl PageAdvancer for MockClicker {
    fn click(&self, point: Point) -> Result<(), AutomationError> {
        self.clicks.lock().unwrap().push(point);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
