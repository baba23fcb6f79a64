//! WAV serialization for the transient transcription artifact.

use crate::defaults;
use crate::error::{HoldtypeError, Result};
use std::path::Path;

/// Write mono 16-bit PCM samples to a WAV file.
///
/// # Errors
/// Returns `HoldtypeError::Serialization` if the file cannot be written.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: defaults::CHANNELS,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| {
        HoldtypeError::Serialization {
            message: format!("Failed to create WAV file: {}", e),
        }
    })?;

    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| HoldtypeError::Serialization {
                message: format!("Failed to write WAV samples: {}", e),
            })?;
    }

    writer.finalize().map_err(|e| HoldtypeError::Serialization {
        message: format!("Failed to finalize WAV file: {}", e),
    })?;

    Ok(())
}

/// Read 16-bit PCM samples and the sample rate from a WAV file.
///
/// Only the mono artifacts this crate writes are expected here; channels
/// beyond the first are not mixed.
///
/// # Errors
/// Returns `HoldtypeError::Serialization` if the file cannot be parsed.
pub fn read_wav(path: &Path) -> Result<(Vec<i16>, u32)> {
    let mut reader = hound::WavReader::open(path).map_err(|e| HoldtypeError::Serialization {
        message: format!("Failed to open WAV file: {}", e),
    })?;

    let sample_rate = reader.spec().sample_rate;
    let samples: Vec<i16> = reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| HoldtypeError::Serialization {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    Ok((samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_preserves_samples_and_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recording.wav");
        let samples = vec![0i16, 100, -100, i16::MAX, i16::MIN];

        write_wav(&path, &samples, 16000).unwrap();
        let (read_back, rate) = read_wav(&path).unwrap();

        assert_eq!(read_back, samples);
        assert_eq!(rate, 16000);
    }

    #[test]
    fn test_write_empty_recording_is_valid_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");

        write_wav(&path, &[], 16000).unwrap();
        let (read_back, rate) = read_wav(&path).unwrap();

        assert!(read_back.is_empty());
        assert_eq!(rate, 16000);
    }

    #[test]
    fn test_write_to_unwritable_path_is_serialization_error() {
        let result = write_wav(Path::new("/nonexistent/dir/out.wav"), &[0i16], 16000);
        assert!(matches!(
            result,
            Err(HoldtypeError::Serialization { .. })
        ));
    }

    #[test]
    fn test_read_garbage_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-wav.wav");
        std::fs::write(&path, b"definitely not RIFF").unwrap();

        assert!(matches!(
            read_wav(&path),
            Err(HoldtypeError::Serialization { .. })
        ));
    }
}
