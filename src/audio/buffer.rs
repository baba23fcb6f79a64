//! Chunk hand-off between the audio callback and the session controller.
//!
//! A [`RecordingBuffer`] is allocated fresh for each recording session. The
//! audio callback pushes chunks through a [`ChunkWriter`]; the controller
//! closes the buffer and drains it exactly once at session end. Draining
//! consumes the buffer, so a second drain of the same session does not
//! compile.

use crate::defaults;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// One callback-delivered block of mono i16 samples.
pub type AudioChunk = Vec<i16>;

/// Producer handle held by the audio callback.
///
/// `push` is non-blocking and performs no I/O; it is safe to call from a
/// real-time audio callback. Rejected chunks (queue full or buffer closed)
/// are counted, never silently discarded.
#[derive(Clone)]
pub struct ChunkWriter {
    tx: Sender<AudioChunk>,
    open: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
}

impl ChunkWriter {
    /// Append a chunk to the session buffer.
    ///
    /// Returns false if the buffer has been closed or the queue is full;
    /// the chunk is counted as dropped in that case.
    pub fn push(&self, chunk: AudioChunk) -> bool {
        if !self.open.load(Ordering::Acquire) {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        match self.tx.try_send(chunk) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// True while the buffer still accepts chunks.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

/// Ordered chunk queue for one recording session.
pub struct RecordingBuffer {
    rx: Receiver<AudioChunk>,
    writer: ChunkWriter,
}

impl RecordingBuffer {
    /// Create a buffer with the default queue capacity.
    pub fn new() -> Self {
        Self::with_capacity(defaults::CHUNK_QUEUE_CAPACITY)
    }

    /// Create a buffer bounded to `capacity` chunks.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        let writer = ChunkWriter {
            tx,
            open: Arc::new(AtomicBool::new(true)),
            dropped: Arc::new(AtomicU64::new(0)),
        };
        Self { rx, writer }
    }

    /// Producer handle for the audio callback.
    pub fn writer(&self) -> ChunkWriter {
        self.writer.clone()
    }

    /// Stop accepting chunks.
    ///
    /// Call only after the capture stream is closed; the stream close is
    /// the ordering barrier that guarantees no callback is mid-push.
    pub fn close(&self) {
        self.writer.open.store(false, Ordering::Release);
    }

    /// Number of chunks rejected since the buffer was created.
    pub fn dropped_chunks(&self) -> u64 {
        self.writer.dropped.load(Ordering::Relaxed)
    }

    /// Read and clear the accumulated chunks into one ordered sample
    /// sequence. Consumes the buffer: each session is drained exactly once.
    pub fn drain(self) -> Vec<i16> {
        let mut samples = Vec::new();
        while let Ok(chunk) = self.rx.try_recv() {
            samples.extend_from_slice(&chunk);
        }
        samples
    }
}

impl Default for RecordingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
