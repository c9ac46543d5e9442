//! Pipeline orchestration: one capture → recognize → synthesize → play.
//!
//! # Pipeline flow
//!
//! ```text
//! run(image_path)
//!   ├─▶ spawn_blocking(ocr.recognize)      — RecognitionFormat on failure
//!   ├─▶ flatten lines                      — EmptyText short-circuit
//!   ├─▶ overwrite session text artifact
//!   ├─▶ select voice (Hangul heuristic)
//!   ├─▶ player busy? stop + teardown wait  — single-artifact invariant
//!   ├─▶ tts.synthesize → fresh unique path — Synthesis on failure
//!   └─▶ playback.begin(artifact)           — Playing (Player on failure)
//! ```
//!
//! All steps are strictly sequential; step N's output is step N+1's input.
//! Blocking work (the OCR subprocess) is pushed onto
//! `tokio::task::spawn_blocking` so the async runtime never stalls.

pub mod runner;

pub use runner::{PipelineError, PipelineOrchestrator};
