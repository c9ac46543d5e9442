//! OCR (optical character recognition) adapter module.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                OcrEngine (trait)               │
//! │                                                │
//! │   ┌──────────────┐        ┌────────────────┐   │
//! │   │ TesseractOcr │        │  MockOcrEngine │   │
//! │   │ (tesseract   │        │  (tests only)  │   │
//! │   │  CLI, stdout)│        └────────────────┘   │
//! │   └──────┬───────┘                             │
//! │          ▼                                     │
//! │   recognize(image) → ordered text lines        │
//! └────────────────────────────────────────────────┘
//! ```
//!
//! The engine returns the recognized lines in reading order; the pipeline
//! flattens them into a [`RecognizedText`] and decides what to do with
//! blank results.

pub mod engine;

pub use engine::{OcrEngine, OcrError, TesseractOcr};

#[cfg(test)]
pub use engine::MockOcrEngine;

// ---------------------------------------------------------------------------
// RecognizedText
// ---------------------------------------------------------------------------

/// The ordered output of one recognition call.
///
/// Derived data — never mutated after construction. The orchestrator owns
/// it for the duration of one pipeline run, writes it to the session text
/// artifact, and hands a clone off as "last recognized text".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedText {
    lines: Vec<String>,
    flattened: String,
}

impl RecognizedText {
    /// Build from raw recognizer lines, preserving order.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let flattened = lines.join("\n");
        Self { lines, flattened }
    }

    /// The recognized lines, in reading order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All lines joined with newlines — the form written to the text
    /// artifact and fed to synthesis.
    pub fn flattened(&self) -> &str {
        &self.flattened
    }

    /// True when no usable text remains after trimming.
    ///
    /// Blank pages must short-circuit the pipeline before synthesis.
    pub fn is_blank(&self) -> bool {
        self.flattened.trim().is_empty()
    }
}
