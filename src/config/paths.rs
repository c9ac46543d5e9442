//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\screenbook\
//!   macOS:   ~/Library/Application Support/screenbook/
//!   Linux:   ~/.config/screenbook/
//!
//! Data dir (working artifacts):
//!   Windows: %LOCALAPPDATA%\screenbook\
//!   macOS:   ~/Library/Application Support/screenbook/
//!   Linux:   ~/.local/share/screenbook/
//!
//! Working artifacts are the per-session recognized-text file (one fixed
//! path, overwritten on every pipeline run) and the per-run audio files.
//! Audio paths are never reused across runs: a run may start while the
//! previous run's file is still open in the playback backend, so each run
//! gets a fresh name from [`AppPaths::unique_audio_path`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-process counter folded into audio artifact names.
///
/// Wall-clock millis alone could collide when two runs start within the
/// same millisecond; the counter cannot.
static AUDIO_SEQ: AtomicU64 = AtomicU64::new(0);

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Directory for working artifacts (text + audio).
    pub result_dir: PathBuf,
    /// Session-scoped recognized-text artifact, overwritten per run.
    pub text_file: PathBuf,
    /// Directory holding the per-run audio artifacts.
    pub audio_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "screenbook";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        Self::in_dirs(config_dir, settings_file, data_dir.join("result"))
    }

    /// Build an `AppPaths` rooted at an explicit directory (useful for
    /// tests, where everything lives under a tempdir).
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let settings_file = base.join("settings.toml");
        let result_dir = base.join("result");
        Self::in_dirs(base, settings_file, result_dir)
    }

    fn in_dirs(config_dir: PathBuf, settings_file: PathBuf, result_dir: PathBuf) -> Self {
        let text_file = result_dir.join("snip_ocr.txt");
        let audio_dir = result_dir.join("audio");
        Self {
            config_dir,
            settings_file,
            result_dir,
            text_file,
            audio_dir,
        }
    }

    /// Generate a fresh audio artifact path under [`audio_dir`].
    ///
    /// The name combines wall-clock millis with a per-process sequence
    /// number, so no two calls ever return the same path.
    ///
    /// [`audio_dir`]: AppPaths::audio_dir
    pub fn unique_audio_path(&self) -> PathBuf {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let seq = AUDIO_SEQ.fetch_add(1, Ordering::Relaxed);
        self.audio_dir.join(format!("tts_{millis}_{seq:04}.mp3"))
    }

    /// Delete stale audio artifacts left behind by previous sessions.
    ///
    /// Returns the number of files removed. Files that cannot be removed
    /// (e.g. still open in a playback backend) are skipped with a warning
    /// rather than failing the whole sweep.
    pub fn clean_audio_artifacts(&self) -> std::io::Result<usize> {
        if !self.audio_dir.exists() {
            return Ok(0);
        }

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.audio_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !name.starts_with("tts_") {
                continue;
            }
            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => {
                    log::warn!(
                        "could not remove stale audio artifact {}: {e}",
                        entry.path().display()
                    );
                }
            }
        }
        Ok(removed)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
