//! Audio capture and WAV encoding.
//!
//! The capturer and encoder are pure Rust so the same code serves the
//! browser (via the WASM exports in `lib.rs`) and native recording.

pub mod capture;
#[cfg(feature = "native")]
pub mod recorder;
pub mod wav;

pub use capture::{Capture, CaptureConfig, Recording};
pub use wav::{encode_wav, StereoBuffer};
