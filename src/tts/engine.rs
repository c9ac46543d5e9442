//! Core `TtsEngine` trait and `HttpTtsEngine` implementation.
//!
//! `HttpTtsEngine` calls a `/synthesize` endpoint that accepts
//! `{ "text": …, "voice": … }` and answers with raw audio bytes. All
//! connection details come from [`TtsConfig`]; nothing is hardcoded.
//!
//! The backend must tolerate being called again immediately after a prior
//! artifact from the same process was stopped — the orchestrator relies on
//! that when a new run supersedes a playing one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::TtsConfig;

// ---------------------------------------------------------------------------
// TtsError
// ---------------------------------------------------------------------------

/// Errors that can occur during speech synthesis.
#[derive(Debug, Error)]
pub enum TtsError {
    /// HTTP transport or connection error.
    #[error("TTS request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("TTS request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("TTS backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// The synthesized bytes could not be written to the artifact path.
    #[error("cannot write audio artifact: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for TtsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TtsError::Timeout
        } else {
            TtsError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TtsEngine trait
// ---------------------------------------------------------------------------

/// Async trait for speech synthesis.
///
/// Implementors must be `Send + Sync` so they can be shared across threads
/// (e.g. wrapped in `Arc<dyn TtsEngine>`).
///
/// # Arguments
/// * `text`     – Text to synthesize. Never empty; the pipeline filters
///                blank pages before calling.
/// * `voice`    – Voice identifier from the language policy.
/// * `out_path` – Freshly generated, never-reused artifact path the audio
///                bytes must be written to.
///
/// Returns the artifact path that was written (i.e. `out_path`).
#[async_trait]
pub trait TtsEngine: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        out_path: &Path,
    ) -> Result<PathBuf, TtsError>;
}

// ---------------------------------------------------------------------------
// HttpTtsEngine
// ---------------------------------------------------------------------------

/// Calls an HTTP synthesis endpoint and writes the returned bytes to the
/// artifact path.
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, voices, timeout) come
/// exclusively from the [`TtsConfig`] passed to
/// [`HttpTtsEngine::from_config`].
pub struct HttpTtsEngine {
    client: reqwest::Client,
    config: TtsConfig,
}

impl HttpTtsEngine {
    /// Build an `HttpTtsEngine` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`. A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &TtsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl TtsEngine for HttpTtsEngine {
    /// POST the text to `{base_url}/synthesize` and stream the audio bytes
    /// into `out_path`.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// local backends that require no authentication.
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        out_path: &Path,
    ) -> Result<PathBuf, TtsError> {
        let url = format!("{}/synthesize", self.config.base_url);

        let body = serde_json::json!({
            "text":  text,
            "voice": voice,
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TtsError::Backend {
                status: status.as_u16(),
                message: message.chars().take(200).collect(),
            });
        }

        let bytes = response.bytes().await?;

        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(out_path, &bytes).await?;

        log::debug!(
            "tts: wrote {} bytes ({voice}) to {}",
            bytes.len(),
            out_path.display()
        );

        Ok(out_path.to_path_buf())
    }
}

// ---------------------------------------------------------------------------
// MockTtsEngine  (test-only)
// ---------------------------------------------------------------------------

/// Test double that writes a stub artifact and records every call.
#[cfg(test)]
pub struct MockTtsEngine {
    fail: bool,
    calls: std::sync::Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl MockTtsEngine {
    /// Create a mock that writes a tiny stub file and succeeds.
    pub fn ok() -> Self {
        Self {
            fail: false,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always fails with a backend error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// The `(text, voice)` pairs synthesized so far, in order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl TtsEngine for MockTtsEngine {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        out_path: &Path,
    ) -> Result<PathBuf, TtsError> {
        if self.fail {
            return Err(TtsError::Backend {
                status: 500,
                message: "mock failure".into(),
            });
        }
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));
        if let Some(parent) = out_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(out_path, b"mock-audio").await?;
        Ok(out_path.to_path_buf())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(api_key: Option<&str>) -> TtsConfig {
        TtsConfig {
            api_key: api_key.map(|s| s.to_string()),
            ..TtsConfig::default()
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let config = make_config(None);
        let _engine = HttpTtsEngine::from_config(&config);
    }

    #[test]
    fn from_config_accepts_empty_api_key() {
        let config = make_config(Some(""));
        let _engine = HttpTtsEngine::from_config(&config);
    }

    /// Verify that `HttpTtsEngine` is object-safe (usable as `dyn TtsEngine`).
    #[test]
    fn engine_is_object_safe() {
        let config = make_config(None);
        let engine: Box<dyn TtsEngine> = Box::new(HttpTtsEngine::from_config(&config));
        drop(engine);
    }

    #[tokio::test]
    async fn mock_writes_artifact_and_records_call() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = dir.path().join("tts_0_0000.mp3");

        let engine = MockTtsEngine::ok();
        let written = engine.synthesize("안녕", "ko-KR-SunHiNeural", &out).await.unwrap();

        assert_eq!(written, out);
        assert!(out.exists());
        assert_eq!(
            engine.calls(),
            vec![("안녕".to_string(), "ko-KR-SunHiNeural".to_string())]
        );
    }

    #[tokio::test]
    async fn failing_mock_writes_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let out = dir.path().join("tts_0_0001.mp3");

        let engine = MockTtsEngine::failing();
        let err = engine.synthesize("x", "v", &out).await.unwrap_err();

        assert!(matches!(err, TtsError::Backend { status: 500, .. }));
        assert!(!out.exists());
    }
}
