//! Voice typing application entry point.
//!
//! Orchestrates the complete flow:
//! hold key → record → release → transcribe → print

use crate::audio::device::{CpalAudioCapture, suppress_audio_warnings};
use crate::config::Config;
use crate::error::Result;
use crate::events::{EventSink, LogSink};
use crate::hotkey::{GlobalHotkeyDispatcher, HotkeyDispatcher, KeyEvent};
use crate::session::SessionController;
use crate::stt::transcriber::{SpeechModel, Transcriber, TranscriptionOutcome};
use crate::stt::whisper::{WhisperConfig, WhisperModel, locate_model};
use std::sync::Arc;

/// Run the push-to-talk loop: register the hotkey, record while it is
/// held, transcribe on release, print recognized text to stdout.
///
/// # Arguments
/// * `config` - Base configuration (can be overridden by CLI args)
/// * `device` - Optional device override from CLI
/// * `model` - Optional model override from CLI
/// * `language` - Optional language override from CLI
/// * `key` - Optional record-key override from CLI
/// * `quiet` - Suppress status messages
/// * `verbosity` - Verbosity level (0=config level, 1+=debug)
///
/// # Returns
/// Ok(()) when the event source shuts down, or an error if startup fails
pub fn run_record_command(
    mut config: Config,
    device: Option<String>,
    model: Option<String>,
    language: Option<String>,
    key: Option<String>,
    quiet: bool,
    verbosity: u8,
) -> Result<()> {
    // Suppress noisy JACK/ALSA warnings before audio init
    suppress_audio_warnings();

    // Apply CLI overrides
    if let Some(d) = device {
        config.audio.device = Some(d);
    }
    if let Some(m) = model {
        config.stt.model = m;
    }
    if let Some(l) = language {
        config.stt.language = l;
    }
    if let Some(k) = key {
        config.hotkey.record_key = k;
    }

    let sink = build_sink(&config, quiet, verbosity)?;

    // Load the model first (this is the slow part)
    if !quiet {
        eprintln!("Loading model '{}'...", config.stt.model);
    }
    let model_path = locate_model(&config.stt.model)?;
    let model = WhisperModel::new(WhisperConfig {
        model_path,
        language: config.stt.language.clone(),
        threads: None,
    })?;
    let transcriber = Transcriber::new(model, config.audio.sample_rate);

    let capture = CpalAudioCapture::new(config.audio.device.as_deref(), Arc::clone(&sink))?;

    let mut dispatcher = GlobalHotkeyDispatcher::new(&config.hotkey.record_key)?;

    if !quiet {
        eprintln!(
            "Hold '{}' to record. Release to transcribe.",
            config.hotkey.record_key
        );
    }

    let mut controller = SessionController::new(capture, transcriber, sink);
    run_event_loop(&mut controller, &mut dispatcher);
    Ok(())
}

/// Drive the controller from a hotkey event source until it shuts down.
///
/// Device errors on press are already reported through the sink by the
/// controller's caller contract; they end the session attempt, not the
/// loop. Recognized text goes to stdout, one line per cycle.
pub fn run_event_loop<C, M>(
    controller: &mut SessionController<C, M>,
    dispatcher: &mut dyn HotkeyDispatcher,
) where
    C: crate::audio::capture::AudioCapture,
    M: SpeechModel,
{
    while let Some(event) = dispatcher.next_event() {
        match event {
            KeyEvent::Pressed => {
                if let Err(e) = controller.on_press_start() {
                    eprintln!("Failed to start recording: {}", e);
                }
            }
            KeyEvent::Released => {
                if let Some(TranscriptionOutcome::Text(text)) = controller.on_release_stop() {
                    println!("{}", text);
                }
            }
        }
    }
}

/// Build the event sink from config, quiet flag and -v count.
fn build_sink(config: &Config, quiet: bool, verbosity: u8) -> Result<Arc<dyn EventSink>> {
    if quiet {
        // Errors still reach stderr; the log file still gets everything.
        let mut logging = config.logging.clone();
        logging.level = "error".to_string();
        return Ok(Arc::new(LogSink::from_config(&logging)?));
    }
    if verbosity >= 1 {
        let mut logging = config.logging.clone();
        logging.level = "debug".to_string();
        return Ok(Arc::new(LogSink::from_config(&logging)?));
    }
    Ok(Arc::new(LogSink::from_config(&config.logging)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::capture::MockAudioCapture;
    use crate::events::MemorySink;
    use crate::hotkey::ScriptedDispatcher;
    use crate::session::SessionState;
    use crate::stt::transcriber::MockModel;

    #[test]
    fn test_event_loop_runs_full_cycle_and_ends_idle() {
        let sink = Arc::new(MemorySink::new());
        let capture = MockAudioCapture::new().with_chunks(vec![vec![1, 2, 3]]);
        let mut controller = SessionController::new(
            capture,
            Transcriber::new(MockModel::new("m").with_response("ok"), 16000),
            sink.clone(),
        );
        let mut dispatcher =
            ScriptedDispatcher::new([KeyEvent::Pressed, KeyEvent::Released]);

        run_event_loop(&mut controller, &mut dispatcher);

        assert_eq!(controller.state(), SessionState::Idle);
        assert!(sink.contains("Recognized: ok"));
    }

    #[test]
    fn test_event_loop_survives_device_errors() {
        let sink = Arc::new(MemorySink::new());
        let capture = MockAudioCapture::new().with_open_failure();
        let mut controller = SessionController::new(
            capture,
            Transcriber::new(MockModel::new("m"), 16000),
            sink,
        );
        let mut dispatcher = ScriptedDispatcher::new([
            KeyEvent::Pressed,
            KeyEvent::Released,
            KeyEvent::Pressed,
        ]);

        run_event_loop(&mut controller, &mut dispatcher);

        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn test_build_sink_quiet_overrides_level() {
        let config = Config::default();
        assert!(build_sink(&config, true, 0).is_ok());
        assert!(build_sink(&config, false, 2).is_ok());
    }
}
