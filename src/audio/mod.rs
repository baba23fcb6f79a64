//! Audio capture and buffering.

pub mod buffer;
pub mod capture;
#[cfg(feature = "cpal-audio")]
pub mod device;
pub mod wav;
