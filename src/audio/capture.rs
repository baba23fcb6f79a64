use crate::audio::buffer::{AudioChunk, ChunkWriter};
use crate::error::{HoldtypeError, Result};
use crate::events::{EventSink, SessionEvent};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};

/// Trait for microphone capture devices.
///
/// This trait allows swapping implementations (real audio device vs mock).
/// One stream per capture: `open` fails while a stream is active, and
/// `close` returns only after no further callback can run — the ordering
/// guarantee that makes the post-close buffer drain race-free.
pub trait AudioCapture: Send {
    /// Open the input stream and begin delivering chunks to `writer`.
    ///
    /// # Errors
    /// Returns a device error if no input device is usable or a stream
    /// from this capture is already open.
    fn open(&mut self, writer: ChunkWriter) -> Result<()>;

    /// Stop delivery and release the device.
    ///
    /// Synchronous: when this returns, no further callback invocation
    /// occurs. Safe to call once per `open`; closing an idle capture is
    /// a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Shared state behind a [`MockAudioCapture`] and its handles.
struct MockState {
    writer: Mutex<Option<ChunkWriter>>,
    opened: AtomicBool,
    sink: Mutex<Option<Arc<dyn EventSink>>>,
}

/// Mock audio capture for testing.
///
/// Chunks configured with `with_chunks` are delivered immediately on
/// `open`, simulating the callback thread; a [`MockCaptureHandle`] taken
/// before the capture moves into the controller can push further chunks
/// mid-session.
pub struct MockAudioCapture {
    state: Arc<MockState>,
    chunks: Vec<AudioChunk>,
    should_fail_open: bool,
    should_fail_close: bool,
    error_message: String,
}

impl MockAudioCapture {
    /// Create a new mock audio capture with default settings.
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState {
                writer: Mutex::new(None),
                opened: AtomicBool::new(false),
                sink: Mutex::new(None),
            }),
            chunks: Vec::new(),
            should_fail_open: false,
            should_fail_close: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Configure chunks delivered as soon as the stream opens.
    pub fn with_chunks(mut self, chunks: Vec<AudioChunk>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Configure the mock to fail on open.
    pub fn with_open_failure(mut self) -> Self {
        self.should_fail_open = true;
        self
    }

    /// Configure the mock to fail on close.
    pub fn with_close_failure(mut self) -> Self {
        self.should_fail_close = true;
        self
    }

    /// Configure the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Configure a sink for simulated stream status reports.
    pub fn with_sink(self, sink: Arc<dyn EventSink>) -> Self {
        if let Ok(mut s) = self.state.sink.lock() {
            *s = Some(sink);
        }
        self
    }

    /// Handle for driving the mock after it moves into a controller.
    pub fn handle(&self) -> MockCaptureHandle {
        MockCaptureHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Check if the capture stream is open.
    pub fn is_open(&self) -> bool {
        self.state.opened.load(Ordering::Acquire)
    }
}

impl Default for MockAudioCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioCapture for MockAudioCapture {
    fn open(&mut self, writer: ChunkWriter) -> Result<()> {
        if self.should_fail_open {
            return Err(HoldtypeError::AudioDeviceNotFound {
                device: self.error_message.clone(),
            });
        }
        if self.state.opened.swap(true, Ordering::AcqRel) {
            return Err(HoldtypeError::AudioCapture {
                message: "stream already open".to_string(),
            });
        }

        for chunk in self.chunks.drain(..) {
            writer.push(chunk);
        }
        if let Ok(mut w) = self.state.writer.lock() {
            *w = Some(writer);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.should_fail_close {
            return Err(HoldtypeError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        self.state.opened.store(false, Ordering::Release);
        if let Ok(mut w) = self.state.writer.lock() {
            *w = None;
        }
        Ok(())
    }
}

/// Cloneable driver for a [`MockAudioCapture`] owned elsewhere.
#[derive(Clone)]
pub struct MockCaptureHandle {
    state: Arc<MockState>,
}

impl MockCaptureHandle {
    /// Push a chunk as the callback thread would.
    ///
    /// Returns false if no stream is open or the buffer rejected the
    /// chunk.
    pub fn push_chunk(&self, chunk: AudioChunk) -> bool {
        match self.state.writer.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(writer) => writer.push(chunk),
                None => false,
            },
            Err(_) => false,
        }
    }

    /// Report a transient stream status error, as the error callback of a
    /// real stream would. Recording is unaffected.
    pub fn report_status(&self, message: &str) {
        if let Ok(guard) = self.state.sink.lock()
            && let Some(sink) = guard.as_ref()
        {
            sink.on_event(SessionEvent::CaptureStatus { message });
        }
    }

    /// Check if the capture stream is open.
    pub fn is_open(&self) -> bool {
        self.state.opened.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::buffer::RecordingBuffer;
    use crate::events::MemorySink;

    #[test]
    fn test_mock_capture_delivers_configured_chunks_on_open() {
        let buffer = RecordingBuffer::new();
        let mut capture = MockAudioCapture::new().with_chunks(vec![vec![1, 2], vec![3]]);

        capture.open(buffer.writer()).unwrap();
        capture.close().unwrap();

        buffer.close();
        assert_eq!(buffer.drain(), vec![1, 2, 3]);
    }

    #[test]
    fn test_mock_capture_open_failure() {
        let buffer = RecordingBuffer::new();
        let mut capture = MockAudioCapture::new()
            .with_open_failure()
            .with_error_message("no such device");

        let result = capture.open(buffer.writer());

        match result {
            Err(HoldtypeError::AudioDeviceNotFound { device }) => {
                assert_eq!(device, "no such device");
            }
            _ => panic!("Expected AudioDeviceNotFound error"),
        }
        assert!(!capture.is_open());
    }

    #[test]
    fn test_mock_capture_rejects_double_open() {
        let buffer = RecordingBuffer::new();
        let mut capture = MockAudioCapture::new();

        capture.open(buffer.writer()).unwrap();
        let second = capture.open(buffer.writer());

        match second {
            Err(HoldtypeError::AudioCapture { message }) => {
                assert_eq!(message, "stream already open");
            }
            _ => panic!("Expected AudioCapture error"),
        }
    }

    #[test]
    fn test_mock_capture_close_failure() {
        let buffer = RecordingBuffer::new();
        let mut capture = MockAudioCapture::new().with_close_failure();

        capture.open(buffer.writer()).unwrap();
        assert!(capture.close().is_err());
    }

    #[test]
    fn test_handle_pushes_chunks_while_open() {
        let buffer = RecordingBuffer::new();
        let mut capture = MockAudioCapture::new();
        let handle = capture.handle();

        capture.open(buffer.writer()).unwrap();
        assert!(handle.push_chunk(vec![7, 8, 9]));
        capture.close().unwrap();

        // After close, the mock no longer holds a writer — simulating that
        // the callback can no longer run.
        assert!(!handle.push_chunk(vec![0]));

        buffer.close();
        assert_eq!(buffer.drain(), vec![7, 8, 9]);
    }

    #[test]
    fn test_handle_status_report_reaches_sink() {
        let sink = Arc::new(MemorySink::new());
        let capture = MockAudioCapture::new().with_sink(sink.clone());
        let handle = capture.handle();

        handle.report_status("input overflow");

        assert!(sink.contains("input overflow"));
    }

    #[test]
    fn test_capture_trait_is_object_safe() {
        let buffer = RecordingBuffer::new();
        let mut capture: Box<dyn AudioCapture> = Box::new(MockAudioCapture::new());
        assert!(capture.open(buffer.writer()).is_ok());
        assert!(capture.close().is_ok());
    }
}
