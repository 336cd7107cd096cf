//! Host configuration.
//!
//! Every field has a default matching the stock export layout, so an empty
//! TOML file (or no file at all) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::capture::DEFAULT_DURATION_SECS;
use crate::error::ConfigError;
use crate::patch::DEFAULT_RUNTIME_CDN;
use crate::sheet::SheetConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// URL of the patch export descriptor.
    pub patch_export_url: String,
    /// URL of the data buffer dependency manifest.
    pub dependencies_url: String,
    /// Prefix added to dependency `file` paths.
    pub export_dir: String,
    /// Base URL runtime scripts are loaded from.
    pub runtime_cdn: String,
    pub capture: CaptureSettings,
    /// Optional spreadsheet parameter feed.
    pub sheet: Option<SheetConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            patch_export_url: "export/patch.export.json".to_string(),
            dependencies_url: "export/dependencies.json".to_string(),
            export_dir: "export/".to_string(),
            runtime_cdn: DEFAULT_RUNTIME_CDN.to_string(),
            capture: CaptureSettings::default(),
            sheet: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub duration_secs: u32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        CaptureSettings {
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
