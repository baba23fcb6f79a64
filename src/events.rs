//! Session observability events and sinks.
//!
//! The controller reports what it does through an injected [`EventSink`]
//! rather than a process-wide logger, so tests can capture events and the
//! binary can route them to stderr and an optional log file.

use crate::config::LoggingConfig;
use crate::error::{HoldtypeError, Result};
use crate::stt::transcriber::TranscriptionOutcome;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use std::time::Duration;

/// Discrete events emitted by the session core.
#[derive(Debug)]
pub enum SessionEvent<'a> {
    /// A recording session started.
    RecordingStarted,
    /// A recording session stopped; transcription is about to run.
    RecordingStopped { samples: usize, duration: Duration },
    /// Chunks were dropped because the queue was full or closed.
    ChunksDropped { count: u64 },
    /// The audio subsystem reported a transient status error;
    /// recording continues.
    CaptureStatus { message: &'a str },
    /// Transcription finished with an outcome (text, empty, or no audio).
    TranscriptionResult { outcome: &'a TranscriptionOutcome },
    /// Transcription failed; the cycle produces no text.
    TranscriptionFailed { error: &'a HoldtypeError },
}

/// Severity used to filter console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a config-file level string.
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(HoldtypeError::ConfigInvalidValue {
                key: "logging.level".to_string(),
                message: format!("unknown level '{}'", other),
            }),
        }
    }
}

/// Sink for session events.
pub trait EventSink: Send + Sync {
    /// Reports an event from the session core.
    fn on_event(&self, event: SessionEvent<'_>);
}

/// Sink that writes to stderr at a configured level and optionally
/// appends every event to a log file.
pub struct LogSink {
    level: LogLevel,
    file: Option<Mutex<File>>,
}

impl LogSink {
    /// Create a sink with the given console level and no log file.
    pub fn new(level: LogLevel) -> Self {
        Self { level, file: None }
    }

    /// Build a sink from the logging section of the config.
    ///
    /// Opening the log file fails fast at startup rather than at the
    /// first event.
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        let level = LogLevel::parse(&config.level)?;
        let file = match &config.file {
            Some(path) => Some(Mutex::new(
                OpenOptions::new().create(true).append(true).open(path)?,
            )),
            None => None,
        };
        Ok(Self { level, file })
    }

    fn line(event: &SessionEvent<'_>) -> (LogLevel, String) {
        match event {
            SessionEvent::RecordingStarted => {
                (LogLevel::Info, "Recording started.".to_string())
            }
            SessionEvent::RecordingStopped { samples, duration } => (
                LogLevel::Info,
                format!(
                    "Recording stopped ({:.1}s, {} samples). Transcribing...",
                    duration.as_secs_f32(),
                    samples
                ),
            ),
            SessionEvent::ChunksDropped { count } => (
                LogLevel::Error,
                format!("Dropped {} audio chunk(s): queue full or closed", count),
            ),
            SessionEvent::CaptureStatus { message } => {
                (LogLevel::Error, format!("Audio stream error: {}", message))
            }
            SessionEvent::TranscriptionResult { outcome } => match outcome {
                TranscriptionOutcome::Text(text) => {
                    (LogLevel::Info, format!("Recognized: {}", text))
                }
                TranscriptionOutcome::Empty => {
                    (LogLevel::Info, "Recognized: [empty]".to_string())
                }
                TranscriptionOutcome::NoAudio => {
                    (LogLevel::Info, "No audio data recorded.".to_string())
                }
            },
            SessionEvent::TranscriptionFailed { error } => {
                (LogLevel::Error, format!("Transcription failed: {}", error))
            }
        }
    }
}

impl EventSink for LogSink {
    fn on_event(&self, event: SessionEvent<'_>) {
        let (level, line) = Self::line(&event);

        if level <= self.level {
            eprintln!("{}", line);
        }

        // The file gets everything, console level notwithstanding.
        if let Some(file) = &self.file
            && let Ok(mut f) = file.lock()
        {
            let _ = writeln!(f, "{}", line);
        }
    }
}

/// Sink that records formatted event lines for test assertions.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded event lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// True if any recorded line contains the given fragment.
    pub fn contains(&self, fragment: &str) -> bool {
        self.lines().iter().any(|l| l.contains(fragment))
    }
}

impl EventSink for MemorySink {
    fn on_event(&self, event: SessionEvent<'_>) {
        let (_, line) = LogSink::line(&event);
        if let Ok(mut events) = self.events.lock() {
            events.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::parse("INFO").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::parse("Debug").unwrap(), LogLevel::Debug);
        assert!(LogLevel::parse("loud").is_err());
    }

    #[test]
    fn test_log_level_ordering_filters_debug_below_info() {
        assert!(LogLevel::Error < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_memory_sink_records_events_in_order() {
        let sink = MemorySink::new();
        sink.on_event(SessionEvent::RecordingStarted);
        sink.on_event(SessionEvent::RecordingStopped {
            samples: 16000,
            duration: Duration::from_secs(1),
        });

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Recording started.");
        assert!(lines[1].contains("16000 samples"));
    }

    #[test]
    fn test_result_lines_distinguish_outcomes() {
        let sink = MemorySink::new();
        sink.on_event(SessionEvent::TranscriptionResult {
            outcome: &TranscriptionOutcome::Text("hello".to_string()),
        });
        sink.on_event(SessionEvent::TranscriptionResult {
            outcome: &TranscriptionOutcome::Empty,
        });
        sink.on_event(SessionEvent::TranscriptionResult {
            outcome: &TranscriptionOutcome::NoAudio,
        });

        assert!(sink.contains("Recognized: hello"));
        assert!(sink.contains("Recognized: [empty]"));
        assert!(sink.contains("No audio data recorded."));
    }

    #[test]
    fn test_log_sink_writes_all_levels_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("holdtype.log");
        let config = LoggingConfig {
            level: "error".to_string(),
            file: Some(log_path.clone()),
        };

        let sink = LogSink::from_config(&config).unwrap();
        // Info-level event, below the error console level
        sink.on_event(SessionEvent::RecordingStarted);

        let contents = std::fs::read_to_string(&log_path).unwrap();
        assert!(contents.contains("Recording started."));
    }

    #[test]
    fn test_log_sink_from_config_rejects_bad_level() {
        let config = LoggingConfig {
            level: "shouting".to_string(),
            file: None,
        };
        assert!(matches!(
            LogSink::from_config(&config),
            Err(HoldtypeError::ConfigInvalidValue { .. })
        ));
    }
}
