//! Patch export types.
//!
//! These map the subset of `patch.export.json` the host reads. The full JSON
//! is kept alongside so it can be handed to the device factory untouched.

use serde::{Deserialize, Serialize};

use crate::error::PatchError;

// ── Patch Export (top-level) ────────────────────────────────

/// A parsed patch export: the typed description plus the raw document.
#[derive(Debug, Clone)]
pub struct PatchExport {
    pub desc: PatchDesc,
    /// The complete export document as fetched.
    pub raw: serde_json::Value,
}

impl PatchExport {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PatchError> {
        let raw: serde_json::Value = serde_json::from_slice(bytes)?;
        Self::from_value(raw)
    }

    pub fn from_value(raw: serde_json::Value) -> Result<Self, PatchError> {
        #[derive(Deserialize)]
        struct Envelope {
            desc: PatchDesc,
        }
        let Envelope { desc } = serde_json::from_value(raw.clone())?;
        Ok(PatchExport { desc, raw })
    }

    /// The RNBO version the patch was exported with.
    pub fn rnbo_version(&self) -> &str {
        &self.desc.meta.rnboversion
    }
}

/// The `desc` section of a patch export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDesc {
    pub meta: PatchMeta,
    #[serde(default)]
    pub inports: Vec<PortDesc>,
    #[serde(default)]
    pub outports: Vec<PortDesc>,
    #[serde(default)]
    pub parameters: Vec<ParameterDesc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_input_channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_output_channels: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchMeta {
    /// Version string, e.g. "1.3.2" or "1.4.0-dev".
    pub rnboversion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

// ── Ports and Parameters ────────────────────────────────────

/// An inport or outport: a named message channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDesc {
    pub tag: String,
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl PortDesc {
    pub fn new(tag: impl Into<String>) -> Self {
        PortDesc {
            tag: tag.into(),
            meta: serde_json::Value::Null,
        }
    }
}

/// A numeric device parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDesc {
    pub param_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ParameterDesc {
    /// Clamp `value` into the declared range, if any.
    pub fn clamp(&self, value: f64) -> f64 {
        let lo = self.minimum.unwrap_or(f64::NEG_INFINITY);
        let hi = self.maximum.unwrap_or(f64::INFINITY);
        if lo <= hi { value.clamp(lo, hi) } else { value }
    }
}

// ── Tests ───────────────────────────────────────────────────
