//! screenbook — assistive screen-reading core.
//!
//! Captures a user-selected screen region, recognizes the text (Tesseract
//! OCR), synthesizes speech over HTTP TTS, and plays the result. In
//! continuous mode it keeps going: when a page's audio finishes it clicks
//! a user-selected "next page" control, waits for the document viewer to
//! settle, and re-captures the same region, until stopped.
//!
//! # Architecture
//!
//! ```text
//! front-end ──FrontendEvent──▶ ContinuousReader ──CoreEvent──▶ front-end
//!                                    │
//!                                    ▼
//!                          PipelineOrchestrator
//!                  capture → OCR → voice policy → TTS ─┐
//!                                                      ▼
//!                          PlaybackStateMachine ── AudioPlayer
//! ```
//!
//! The GUI (toolbar, region overlay) and the actual screen-grab live
//! outside this crate; they connect through the [`capture::ScreenCapture`]
//! trait and the two event channels in [`events`].

pub mod automation;
pub mod capture;
pub mod config;
pub mod events;
pub mod ocr;
pub mod pipeline;
pub mod playback;
pub mod player;
pub mod reader;
pub mod tts;

pub use capture::{Point, Region};
pub use config::{AppConfig, AppPaths};
pub use events::{CoreEvent, FrontendEvent};
pub use pipeline::{PipelineError, PipelineOrchestrator};
pub use playback::{new_shared_playback, PlaybackState, SharedPlayback};
pub use reader::{ContinuousReader, ReaderState};
