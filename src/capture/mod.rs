//! Screen-region geometry and the capture seam.
//!
//! The actual screen-grab mechanism (the snipping overlay, the OS
//! screenshot API) lives in the front-end; the core only needs a
//! synchronous [`ScreenCapture`] implementation it can call with a fixed
//! [`Region`] every time the continuous reader advances a page.

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle in absolute screen coordinates.
///
/// Immutable once a continuous-reading session has started: the same
/// rectangle is re-sampled for every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a region from two arbitrary corner points, normalising so the
    /// origin is the top-left corner regardless of drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        let width = a.x.abs_diff(b.x);
        let height = a.y.abs_diff(b.y);
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A region that encloses no pixels cannot produce a useful capture.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Absolute screen coordinate — used for the "next page" click target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors from the capture collaborator.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The requested region encloses no pixels.
    #[error("capture region is empty")]
    EmptyRegion,

    /// The underlying grab mechanism failed.
    #[error("screen grab failed: {0}")]
    Grab(String),
}

// ---------------------------------------------------------------------------
// ScreenCapture trait
// ---------------------------------------------------------------------------

/// Synchronous screen-grab capability.
///
/// `grab` must return only after the image file is fully written — the
/// pipeline feeds the returned path straight into OCR.
pub trait ScreenCapture: Send + Sync {
    /// Capture `region` and return the path of the written image file.
    fn grab(&self, region: Region) -> Result<PathBuf, CaptureError>;
}

// ---------------------------------------------------------------------------
// MockCapture  (test-only)
// ---------------------------------------------------------------------------

/// Test double that records every grab and returns a canned image path.
#[cfg(test)]
pub struct MockCapture {
    image_path: PathBuf,
    grabs: std::sync::Mutex<Vec<Region>>,
}

#[cfg(test)]
impl MockCapture {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
            grabs: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Regions grabbed so far, in order.
    pub fn grabs(&self) -> Vec<Region> {
        self.grabs.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ScreenCapture for MockCapture {
    fn grab(&self, region: Region) -> Result<PathBuf, CaptureError> {
        if region.is_empty() {
            return Err(CaptureError::EmptyRegion);
        }
        self.grabs.lock().unwrap().push(region);
        Ok(self.image_path.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_normalises_drag_direction() {
        let a = Point::new(800, 600);
        let b = Point::new(0, 0);
        let region = Region::from_corners(a, b);
        assert_eq!(region, Region::new(0, 0, 800, 600));
    }

    #[test]
    fn from_corners_same_point_is_empty() {
        let p = Point::new(10, 10);
        assert!(Region::from_corners(p, p).is_empty());
    }

    #[test]
    fn mock_capture_records_regions() {
        let capture = MockCapture::new("/tmp/snip.png");
        let r = Region::new(0, 0, 800, 600);
        let path = capture.grab(r).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/snip.png"));
        assert_eq!(capture.grabs(), vec![r]);
    }

    #[test]
    fn mock_capture_rejects_empty_region() {
        let capture = MockCapture::new("/tmp/snip.png");
        let err = capture.grab(Region::new(5, 5, 0, 10)).unwrap_err();
        assert!(matches!(err, CaptureError::EmptyRegion));
        assert!(capture.grabs().is_empty());
    }
}
