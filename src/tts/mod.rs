//! Speech-synthesis adapter module.
//!
//! [`TtsEngine`] is the async seam the pipeline talks to; [`HttpTtsEngine`]
//! is the production implementation backed by an HTTP synthesis service.
//! The voice handed to the engine comes from the language policy in
//! [`voice`]: any Hangul in the text selects the Korean voice, everything
//! else gets the English voice.

pub mod engine;
pub mod voice;

pub use engine::{HttpTtsEngine, TtsEngine, TtsError};
pub use voice::{contains_hangul, select_voice};

#[cfg(test)]
pub use engine::MockTtsEngine;
