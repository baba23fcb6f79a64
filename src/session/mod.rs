//! Recording session state machine.
//!
//! One [`SessionController`] drives the whole press→record→release→
//! transcribe cycle. The audio callback is the only other execution
//! context that touches session data, and it does so exclusively through
//! the session's [`crate::audio::buffer::ChunkWriter`]; the controller
//! never drains the buffer until the capture stream is closed, so no
//! locking is needed around the samples themselves.

use crate::audio::buffer::RecordingBuffer;
use crate::audio::capture::AudioCapture;
use crate::error::Result;
use crate::events::{EventSink, SessionEvent};
use crate::stt::transcriber::{SpeechModel, Transcriber, TranscriptionOutcome};
use std::sync::Arc;
use std::time::Instant;

/// Controller state, observable for tests and status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Recording,
}

/// Live recording state between press and release.
struct ActiveSession {
    buffer: RecordingBuffer,
    started_at: Instant,
}

/// Two-state controller for press-to-talk recording.
///
/// Transcription runs synchronously on the caller's thread, so a second
/// transcription can never start while one is in flight; a press event
/// delivered meanwhile is handled afterwards and begins a fresh session.
pub struct SessionController<C: AudioCapture, M: SpeechModel> {
    capture: C,
    transcriber: Transcriber<M>,
    sink: Arc<dyn EventSink>,
    session: Option<ActiveSession>,
}

impl<C: AudioCapture, M: SpeechModel> SessionController<C, M> {
    /// Create an idle controller.
    pub fn new(capture: C, transcriber: Transcriber<M>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            capture,
            transcriber,
            sink,
            session: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Recording
        } else {
            SessionState::Idle
        }
    }

    /// Handle a key press: begin a recording session.
    ///
    /// A duplicate press while already recording is a no-op, not an
    /// error. A device failure leaves the controller idle and is
    /// returned to the caller.
    pub fn on_press_start(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }

        let buffer = RecordingBuffer::new();
        self.capture.open(buffer.writer())?;

        self.session = Some(ActiveSession {
            buffer,
            started_at: Instant::now(),
        });
        self.sink.on_event(SessionEvent::RecordingStarted);
        Ok(())
    }

    /// Handle a key release: stop recording and transcribe.
    ///
    /// A stray release while idle is a no-op returning `None`. Otherwise
    /// the capture stream is closed first — `close` returns only once no
    /// callback can run — then the buffer is drained exactly once and the
    /// samples are transcribed on this thread.
    ///
    /// Transcription failures are recovered here: they are reported
    /// through the event sink and the cycle yields `None`.
    pub fn on_release_stop(&mut self) -> Option<TranscriptionOutcome> {
        let session = self.session.take()?;

        // Close before drain: the ordering barrier that makes the drain
        // race-free. A close failure still ends the session; whatever was
        // buffered is transcribed.
        if let Err(e) = self.capture.close() {
            self.sink.on_event(SessionEvent::CaptureStatus {
                message: &e.to_string(),
            });
        }
        session.buffer.close();

        let dropped = session.buffer.dropped_chunks();
        if dropped > 0 {
            self.sink
                .on_event(SessionEvent::ChunksDropped { count: dropped });
        }

        let samples = session.buffer.drain();
        self.sink.on_event(SessionEvent::RecordingStopped {
            samples: samples.len(),
            duration: session.started_at.elapsed(),
        });

        match self.transcriber.transcribe(&samples) {
            Ok(outcome) => {
                self.sink
                    .on_event(SessionEvent::TranscriptionResult { outcome: &outcome });
                Some(outcome)
            }
            Err(error) => {
                self.sink
                    .on_event(SessionEvent::TranscriptionFailed { error: &error });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::capture::MockAudioCapture;
    use crate::events::MemorySink;
    use crate::stt::transcriber::MockModel;

    fn controller_with(
        capture: MockAudioCapture,
        model: MockModel,
    ) -> (SessionController<MockAudioCapture, MockModel>, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let controller =
            SessionController::new(capture, Transcriber::new(model, 16000), sink.clone());
        (controller, sink)
    }

    #[test]
    fn test_initial_state_is_idle() {
        let (controller, _) = controller_with(MockAudioCapture::new(), MockModel::new("m"));
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn test_press_transitions_to_recording() {
        let (mut controller, sink) =
            controller_with(MockAudioCapture::new(), MockModel::new("m"));

        controller.on_press_start().unwrap();

        assert_eq!(controller.state(), SessionState::Recording);
        assert!(sink.contains("Recording started."));
    }

    #[test]
    fn test_duplicate_press_is_noop() {
        let (mut controller, sink) =
            controller_with(MockAudioCapture::new(), MockModel::new("m"));

        controller.on_press_start().unwrap();
        controller.on_press_start().unwrap();

        assert_eq!(controller.state(), SessionState::Recording);
        // Only the first press emitted an event.
        assert_eq!(
            sink.lines()
                .iter()
                .filter(|l| l.contains("Recording started."))
                .count(),
            1
        );
    }

    #[test]
    fn test_stray_release_is_noop() {
        let (mut controller, sink) =
            controller_with(MockAudioCapture::new(), MockModel::new("m"));

        assert!(controller.on_release_stop().is_none());
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_release_transcribes_captured_chunks() {
        let capture = MockAudioCapture::new().with_chunks(vec![vec![1, 2], vec![3, 4]]);
        let (mut controller, sink) =
            controller_with(capture, MockModel::new("m").with_response("hello"));

        controller.on_press_start().unwrap();
        let outcome = controller.on_release_stop();

        assert_eq!(outcome, Some(TranscriptionOutcome::Text("hello".to_string())));
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(sink.contains("4 samples"));
        assert!(sink.contains("Recognized: hello"));
    }

    #[test]
    fn test_release_with_no_chunks_is_no_audio_outcome() {
        let (mut controller, sink) =
            controller_with(MockAudioCapture::new(), MockModel::new("m"));

        controller.on_press_start().unwrap();
        let outcome = controller.on_release_stop();

        assert_eq!(outcome, Some(TranscriptionOutcome::NoAudio));
        assert!(sink.contains("No audio data recorded."));
    }

    #[test]
    fn test_device_error_on_press_stays_idle() {
        let capture = MockAudioCapture::new().with_open_failure();
        let (mut controller, _) = controller_with(capture, MockModel::new("m"));

        assert!(controller.on_press_start().is_err());
        assert_eq!(controller.state(), SessionState::Idle);
    }

    #[test]
    fn test_press_works_again_after_device_error() {
        // One failed session start must not poison the controller.
        let capture = MockAudioCapture::new().with_open_failure();
        let (mut controller, _) = controller_with(capture, MockModel::new("m"));

        assert!(controller.on_press_start().is_err());
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(controller.on_release_stop().is_none());
    }

    #[test]
    fn test_transcription_failure_is_recovered_and_reported() {
        let capture = MockAudioCapture::new().with_chunks(vec![vec![1, 2, 3]]);
        let (mut controller, sink) =
            controller_with(capture, MockModel::new("m").with_failure());

        controller.on_press_start().unwrap();
        let outcome = controller.on_release_stop();

        assert!(outcome.is_none());
        assert_eq!(controller.state(), SessionState::Idle);
        assert!(sink.contains("Transcription failed"));
    }

    #[test]
    fn test_close_failure_still_transcribes_buffered_audio() {
        let capture = MockAudioCapture::new()
            .with_chunks(vec![vec![9, 9]])
            .with_close_failure();
        let (mut controller, sink) =
            controller_with(capture, MockModel::new("m").with_response("partial"));

        controller.on_press_start().unwrap();
        let outcome = controller.on_release_stop();

        assert_eq!(
            outcome,
            Some(TranscriptionOutcome::Text("partial".to_string()))
        );
        assert!(sink.contains("Audio stream error"));
    }

    #[test]
    fn test_alternating_press_release_cycles() {
        let (mut controller, _) =
            controller_with(MockAudioCapture::new(), MockModel::new("m"));

        for _ in 0..3 {
            assert_eq!(controller.state(), SessionState::Idle);
            controller.on_press_start().unwrap();
            assert_eq!(controller.state(), SessionState::Recording);
            controller.on_release_stop();
            assert_eq!(controller.state(), SessionState::Idle);
        }
    }

    #[test]
    fn test_dropped_chunks_are_reported_at_stop() {
        let capture = MockAudioCapture::new();
        let handle = capture.handle();
        let (mut controller, sink) = controller_with(capture, MockModel::new("m"));

        controller.on_press_start().unwrap();
        // One more chunk than the queue holds: the overflow chunk is
        // dropped, counted, and reported at stop.
        for _ in 0..=crate::defaults::CHUNK_QUEUE_CAPACITY {
            handle.push_chunk(vec![0i16; 16]);
        }
        let outcome = controller.on_release_stop();

        assert!(outcome.is_some());
        assert!(sink.contains("Dropped 1 audio chunk(s)"));
    }
}
