//! Configuration: settings structs, TOML persistence and application paths.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{AppConfig, OcrConfig, PlaybackConfig, ReaderConfig, TtsConfig};
