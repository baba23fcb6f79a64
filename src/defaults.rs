//! Default configuration constants for holdtype.
//!
//! Shared constants used across configuration types and components
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Number of capture channels. Recording is mono by design; any channel
/// mixing or resampling is out of scope.
pub const CHANNELS: u16 = 1;

/// Default Whisper model name.
pub const DEFAULT_MODEL: &str = "base.en";

/// Default language code for transcription.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default push-to-talk key.
pub const DEFAULT_RECORD_KEY: &str = "F9";

/// Capacity of the chunk queue between the audio callback and the
/// session controller, in chunks.
///
/// cpal delivers on the order of 10-100ms of audio per callback, so 512
/// chunks buffers minutes of speech. When the queue is full the callback
/// drops the chunk and counts it; it never blocks.
pub const CHUNK_QUEUE_CAPACITY: usize = 512;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_is_whisper_native() {
        assert_eq!(SAMPLE_RATE, 16000);
        assert_eq!(CHANNELS, 1);
    }

    #[test]
    fn queue_capacity_covers_long_recordings() {
        // 512 chunks at a worst-case 10ms per chunk is still > 5s of audio;
        // typical cpal periods are far larger.
        assert!(CHUNK_QUEUE_CAPACITY >= 512);
    }
}
