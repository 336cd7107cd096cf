use thiserror::Error;

/// Errors raised by the WAV encoder and the capturer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudioError {
    #[error("Channel length mismatch: left has {left} samples, right has {right}")]
    ChannelMismatch { left: usize, right: usize },
    #[error("Invalid sample rate: {rate}")]
    InvalidSampleRate { rate: u32 },
    #[error("Invalid capture duration: {secs}s")]
    InvalidDuration { secs: u32 },
    #[error("Recording too long for a WAV container: {frames} frames")]
    TooLong { frames: u64 },
    #[error("Capture already finalized")]
    AlreadyFinalized,
}

impl AudioError {
    /// True for the malformed-input class of errors (mismatched channels,
    /// zero sample rate or duration).
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AudioError::ChannelMismatch { .. }
                | AudioError::InvalidSampleRate { .. }
                | AudioError::InvalidDuration { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Malformed patch export: {0}")]
    Json(#[from] serde_json::Error),
    #[error(
        "Patcher exported with a Debug Version ({version}). Please specify the correct RNBO version to use."
    )]
    DebugVersion { version: String },
    #[error("Failed to load rnbo.js v{version}: {reason}")]
    RuntimeLoad { version: String, reason: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("HTTP error! Status: {status}")]
    HttpStatus { status: u16 },
    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("Sheet has no rows")]
    EmptySheet,
    #[error("Latest row has no characters")]
    EmptyRow,
    #[error(transparent)]
    Device(#[from] DeviceError),
}

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device creation failed: {0}")]
    Create(String),
    #[error("Unknown parameter '{id}'")]
    UnknownParameter { id: String },
    #[error("Failed to load data buffer dependencies: {0}")]
    Dependencies(String),
    #[error("Audio graph error: {0}")]
    Graph(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors surfaced by session setup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Patch(#[from] PatchError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_classification() {
        assert!(AudioError::ChannelMismatch { left: 1, right: 2 }.is_invalid_input());
        assert!(AudioError::InvalidSampleRate { rate: 0 }.is_invalid_input());
        assert!(!AudioError::AlreadyFinalized.is_invalid_input());
        assert!(!AudioError::TooLong { frames: u64::MAX }.is_invalid_input());
    }

    #[test]
    fn display_messages() {
        let e = FetchError::HttpStatus { status: 404 };
        assert_eq!(e.to_string(), "HTTP error! Status: 404");
        let e: SetupError = DeviceError::Create("boom".to_string()).into();
        assert_eq!(e.to_string(), "Device creation failed: boom");
    }
}
