//! Data buffer dependency manifest (`dependencies.json`).

use serde::{Deserialize, Serialize};

/// One entry of the dependency manifest. Fields the host does not read are
/// carried through unchanged for the device loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Path of a local audio file, relative to the export directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Remote audio file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Dependency {
    pub fn file(id: &str, file: &str) -> Self {
        Dependency {
            id: Some(id.to_string()),
            file: Some(file.to_string()),
            url: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Parse a manifest body.
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<Dependency>, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Prefix every `file` path with `dir`. Entries without a file are left alone.
pub fn rewrite_dependencies(deps: Vec<Dependency>, dir: &str) -> Vec<Dependency> {
    deps.into_iter()
        .map(|mut d| {
            if let Some(file) = d.file.take() {
                d.file = Some(format!("{dir}{file}"));
            }
            d
        })
        .collect()
}
