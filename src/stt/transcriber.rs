use crate::audio::wav;
use crate::error::{HoldtypeError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Result of one transcription cycle.
///
/// `Empty` (the model ran and produced nothing, e.g. silence) and
/// `NoAudio` (nothing was recorded, the model never ran) are both valid
/// non-error outcomes, distinct from each other and from failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionOutcome {
    /// Non-empty transcribed text.
    Text(String),
    /// The model produced no text.
    Empty,
    /// The recording contained no samples; the model was not invoked.
    NoAudio,
}

/// Trait for the wrapped speech model.
///
/// The model is a black box that consumes a WAV file and produces text
/// (possibly empty). This trait allows swapping implementations (real
/// Whisper vs mock).
pub trait SpeechModel: Send + Sync {
    /// Transcribe the audio in a WAV file to text.
    ///
    /// # Errors
    /// Returns `HoldtypeError::ModelInference` if inference fails.
    fn transcribe_wav(&self, path: &Path) -> Result<String>;

    /// Get the name of the loaded model
    fn model_name(&self) -> &str;
}

/// Implement SpeechModel for Arc<M> to allow sharing a loaded model.
impl<M: SpeechModel> SpeechModel for Arc<M> {
    fn transcribe_wav(&self, path: &Path) -> Result<String> {
        (**self).transcribe_wav(path)
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

/// Bridges a drained recording to the file-consuming speech model.
///
/// Samples are persisted to a uniquely named transient WAV artifact which
/// is deleted on every exit path: the `NamedTempFile` guard removes the
/// file when it leaves scope, whether serialization or inference failed
/// or succeeded.
pub struct Transcriber<M: SpeechModel> {
    model: M,
    sample_rate: u32,
}

impl<M: SpeechModel> Transcriber<M> {
    /// Create a transcriber around a loaded model.
    pub fn new(model: M, sample_rate: u32) -> Self {
        Self { model, sample_rate }
    }

    /// Name of the wrapped model.
    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Transcribe a drained recording to text.
    ///
    /// An empty recording short-circuits to `NoAudio` without touching
    /// the filesystem or the model.
    ///
    /// # Errors
    /// `Serialization` if the artifact cannot be written, `ModelInference`
    /// if the model fails. Both leave no artifact behind.
    pub fn transcribe(&self, samples: &[i16]) -> Result<TranscriptionOutcome> {
        if samples.is_empty() {
            return Ok(TranscriptionOutcome::NoAudio);
        }

        let artifact = tempfile::Builder::new()
            .prefix("holdtype-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| HoldtypeError::Serialization {
                message: format!("Failed to create transient audio file: {}", e),
            })?;

        wav::write_wav(artifact.path(), samples, self.sample_rate)?;

        let text = self.model.transcribe_wav(artifact.path())?;

        let text = text.trim();
        if text.is_empty() {
            Ok(TranscriptionOutcome::Empty)
        } else {
            Ok(TranscriptionOutcome::Text(text.to_string()))
        }
    }
}

/// Mock speech model for testing.
///
/// Records every artifact path it is handed, together with whether the
/// file existed at call time, so tests can verify artifact lifecycle.
#[derive(Debug)]
pub struct MockModel {
    model_name: String,
    response: String,
    should_fail: bool,
    calls: Mutex<Vec<(PathBuf, bool)>>,
}

impl MockModel {
    /// Create a new mock model with default settings.
    pub fn new(model_name: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            response: "mock transcription".to_string(),
            should_fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Configure the mock to return a specific response.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Artifact paths seen so far, each with whether the file existed
    /// during the call.
    pub fn calls(&self) -> Vec<(PathBuf, bool)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl SpeechModel for MockModel {
    fn transcribe_wav(&self, path: &Path) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((path.to_path_buf(), path.exists()));
        }
        if self.should_fail {
            Err(HoldtypeError::ModelInference {
                message: "mock inference failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
