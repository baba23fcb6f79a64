//! Real microphone capture using CPAL (Cross-Platform Audio Library).

use crate::audio::buffer::ChunkWriter;
use crate::audio::capture::AudioCapture;
use crate::defaults;
use crate::error::{HoldtypeError, Result};
use crate::events::{EventSink, SessionEvent};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::Arc;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Suppress noisy JACK/ALSA error messages that occur during audio backend probing.
///
/// # Safety
/// This modifies environment variables which is safe when called before spawning threads.
pub fn suppress_audio_warnings() {
    // SAFETY: Called at startup before any threads are spawned
    unsafe {
        std::env::set_var("JACK_NO_START_SERVER", "1");
        std::env::set_var("JACK_NO_AUDIO_RESERVATION", "1");
        std::env::set_var("PIPEWIRE_DEBUG", "0");
        std::env::set_var("ALSA_DEBUG", "0");
        std::env::set_var("PW_LOG", "0");
    }
}

/// Preferred device names for GNOME/PipeWire environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Check if a device name should be filtered out.
fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// # Returns
/// A vector of device names, with preferred devices marked with "\[recommended\]".
/// Filters out obviously unusable devices (surround channels, HDMI, etc.).
///
/// # Errors
/// Returns `HoldtypeError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| HoldtypeError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }

            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
///
/// This ensures we respect the desktop's audio device selection.
///
/// # Errors
/// Returns `HoldtypeError::AudioDeviceNotFound` if no input device is available.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| HoldtypeError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: The stream is only touched from the controller thread; it is
/// created, played, paused and dropped there, never across threads.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone capture backed by CPAL.
///
/// Captures 16-bit PCM at 16kHz mono, the format the transcription model
/// consumes. Tries an i16 stream first, then f32 with conversion in the
/// callback; anything needing channel mixing or resampling is rejected.
pub struct CpalAudioCapture {
    device: cpal::Device,
    stream: Option<SendableStream>,
    sample_rate: u32,
    sink: Arc<dyn EventSink>,
}

impl CpalAudioCapture {
    /// Create a capture bound to a named device, or the best default.
    ///
    /// # Errors
    /// Returns errors if the device is not found or enumeration fails.
    pub fn new(device_name: Option<&str>, sink: Arc<dyn EventSink>) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host
                    .input_devices()
                    .map_err(|e| HoldtypeError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| HoldtypeError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        Ok(Self {
            device,
            stream: None,
            sample_rate: defaults::SAMPLE_RATE,
            sink,
        })
    }

    /// Build the input stream delivering chunks to `writer`.
    ///
    /// Tries i16/16kHz/mono, then f32/16kHz/mono with sample conversion.
    /// PipeWire/PulseAudio convert rate and channels transparently, so one
    /// of the two works on any desktop setup this targets.
    fn build_stream(&self, writer: ChunkWriter) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: defaults::CHANNELS,
            sample_rate: self.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        // Status flags from a live stream are reported and recording
        // continues; only a failed build aborts the session start.
        let sink = Arc::clone(&self.sink);
        let err_callback = move |err: cpal::StreamError| {
            sink.on_event(SessionEvent::CaptureStatus {
                message: &err.to_string(),
            });
        };

        let i16_writer = writer.clone();
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                // Non-blocking, no I/O: push counts its own rejections.
                i16_writer.push(data.to_vec());
            },
            err_callback.clone(),
            None,
        ) {
            return Ok(stream);
        }

        self.device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let chunk: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    writer.push(chunk);
                },
                err_callback,
                None,
            )
            .map_err(|e| HoldtypeError::AudioCapture {
                message: format!("Failed to build input stream: {}", e),
            })
    }
}

impl AudioCapture for CpalAudioCapture {
    fn open(&mut self, writer: ChunkWriter) -> Result<()> {
        if self.stream.is_some() {
            return Err(HoldtypeError::AudioCapture {
                message: "stream already open".to_string(),
            });
        }

        let stream = self.build_stream(writer)?;
        stream.play().map_err(|e| HoldtypeError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        self.stream = Some(SendableStream(stream));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(stream) = self.stream.take() {
            stream.0.pause().map_err(|e| HoldtypeError::AudioCapture {
                message: format!("Failed to stop audio stream: {}", e),
            })?;
            // Dropping the stream tears down the callback synchronously;
            // once this returns no further chunk can be pushed.
            drop(stream);
        }
        Ok(())
    }
}
