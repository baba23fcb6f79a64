//! holdtype - Push-to-talk voice transcription for the Linux desktop
//!
//! Hold a key to record speech, release it to transcribe.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod events;
pub mod hotkey;
pub mod session;
pub mod stt;

// Composition root - needs the real audio and hotkey backends
#[cfg(all(feature = "cpal-audio", feature = "hotkeys"))]
pub mod app;

// Core traits (input → session → model)
pub use audio::capture::AudioCapture;
pub use hotkey::{HotkeyDispatcher, KeyEvent};
pub use stt::transcriber::SpeechModel;

// Session core
pub use audio::buffer::{AudioChunk, ChunkWriter, RecordingBuffer};
pub use session::{SessionController, SessionState};
pub use stt::transcriber::{Transcriber, TranscriptionOutcome};

// Error handling
pub use error::{HoldtypeError, Result};

// Observability
pub use events::{EventSink, LogSink, MemorySink, SessionEvent};

// Config
pub use config::Config;
