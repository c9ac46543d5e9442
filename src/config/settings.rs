//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// OcrConfig
// ---------------------------------------------------------------------------

/// Settings for the Tesseract OCR adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Name (or full path) of the `tesseract` executable.
    pub binary: String,
    /// Language packs passed as `-l` (e.g. `"kor+eng"`).
    pub languages: String,
    /// OCR engine mode (`--oem`).
    pub engine_mode: u8,
    /// Page segmentation mode (`--psm`). 6 = assume a uniform block of
    /// text, which matches a captured book page.
    pub page_seg_mode: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".into(),
            languages: "kor+eng".into(),
            engine_mode: 3,
            page_seg_mode: 6,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for the HTTP speech-synthesis adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    /// Base URL of the synthesis endpoint.
    pub base_url: String,
    /// API key — `None` for local backends that need no authentication.
    pub api_key: Option<String>,
    /// Voice used when the recognized text contains Hangul.
    pub korean_voice: String,
    /// Voice used otherwise.
    pub english_voice: String,
    /// Maximum seconds to wait for a synthesis response.
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5002".into(),
            api_key: None,
            korean_voice: "ko-KR-SunHiNeural".into(),
            english_voice: "en-US-JennyNeural".into(),
            timeout_secs: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// PlaybackConfig
// ---------------------------------------------------------------------------

/// Settings for the playback state machine and its polling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Interval in milliseconds between busy/idle polls of the audio
    /// backend. Polling is the only completion signal the backend offers.
    pub poll_interval_ms: u64,
    /// Milliseconds to wait after stopping a still-busy player before the
    /// next synthesis writes a new artifact. Gives the backend time to
    /// release its file handle.
    pub teardown_wait_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            teardown_wait_ms: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// ReaderConfig
// ---------------------------------------------------------------------------

/// Settings for the continuous reading controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Milliseconds to wait after the next-page click before re-capturing,
    /// so the external document viewer finishes rendering.
    pub settle_delay_ms: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 2_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use screenbook::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// OCR adapter settings.
    pub ocr: OcrConfig,
    /// Speech-synthesis adapter settings.
    pub tts: TtsConfig,
    /// Playback state machine / polling settings.
    pub playback: PlaybackConfig,
    /// Continuous reading settings.
    pub reader: ReaderConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
