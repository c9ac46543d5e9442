//! Core OCR engine trait and the Tesseract CLI implementation.
//!
//! [`OcrEngine`] is the interface used by the pipeline. It is object-safe
//! and `Send + Sync` so it can be held behind an `Arc<dyn OcrEngine>` and
//! called from `spawn_blocking`.
//!
//! [`TesseractOcr`] is the production implementation. It shells out to the
//! `tesseract` binary with the configured language packs and reads the
//! recognized text from stdout; no in-process model is loaded.
//!
//! [`MockOcrEngine`] (test-only) returns a pre-configured response.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::config::OcrConfig;

// ---------------------------------------------------------------------------
// OcrError
// ---------------------------------------------------------------------------

/// All errors that can arise from the OCR subsystem.
#[derive(Debug, Clone, Error)]
pub enum OcrError {
    /// The image file to recognize does not exist.
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// The recognizer process could not be started or exited with failure.
    #[error("OCR backend failed: {0}")]
    Backend(String),

    /// The recognizer produced output in a shape we cannot interpret.
    #[error("unrecognized OCR output: {0}")]
    UnrecognizedOutput(String),
}

// ---------------------------------------------------------------------------
// OcrEngine trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for text recognizers.
///
/// # Contract
///
/// - `image_path` must name an existing image file.
/// - On success the lines come back in reading order; lines may be empty
///   only if the recognizer emitted them that way inside a page.
/// - A blank page yields `Ok(vec![])` — deciding how to react to blank
///   pages is the pipeline's job, not the adapter's.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in the image at `image_path`.
    fn recognize(&self, image_path: &Path) -> Result<Vec<String>, OcrError>;
}

// Compile-time assertion: Box<dyn OcrEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn OcrEngine>) {}
};

// ---------------------------------------------------------------------------
// TesseractOcr
// ---------------------------------------------------------------------------

/// Production OCR engine that invokes the `tesseract` CLI.
///
/// Each call spawns a fresh process, so the engine can be shared across
/// threads without locking. The call blocks until tesseract exits — run it
/// through `tokio::task::spawn_blocking` from async code.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    /// Build a `TesseractOcr` from application config.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl OcrEngine for TesseractOcr {
    /// Run `tesseract <image> stdout -l <languages> --oem <n> --psm <n>`
    /// and split the output into trimmed, non-empty lines.
    fn recognize(&self, image_path: &Path) -> Result<Vec<String>, OcrError> {
        if !image_path.exists() {
            return Err(OcrError::ImageNotFound(image_path.display().to_string()));
        }

        let output = Command::new(&self.config.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.config.languages])
            .args(["--oem", &self.config.engine_mode.to_string()])
            .args(["--psm", &self.config.page_seg_mode.to_string()])
            .output()
            .map_err(|e| OcrError::Backend(format!("{}: {e}", self.config.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Backend(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8(output.stdout)
            .map_err(|e| OcrError::UnrecognizedOutput(format!("non-UTF-8 output: {e}")))?;

        let lines = text
            .lines()
            .map(|l| l.trim_end().to_string())
            .filter(|l| !l.trim().is_empty())
            .collect();

        Ok(lines)
    }
}

// ---------------------------------------------------------------------------
// MockOcrEngine  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without spawning
/// any process.
#[cfg(test)]
pub struct MockOcrEngine {
    response: Result<Vec<String>, OcrError>,
    delay: Option<std::time::Duration>,
}

#[cfg(test)]
impl MockOcrEngine {
    /// Create a mock that always returns the given lines.
    pub fn ok<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            response: Ok(lines.into_iter().map(Into::into).collect()),
            delay: None,
        }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: OcrError) -> Self {
        Self {
            response: Err(error),
            delay: None,
        }
    }

    /// Make every `recognize` call block for `delay` first, imitating a
    /// slow recognizer run.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[cfg(test)]
impl OcrEngine for MockOcrEngine {
    fn recognize(&self, _image_path: &Path) -> Result<Vec<String>, OcrError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
