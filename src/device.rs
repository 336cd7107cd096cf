//! Interfaces to the external synthesis runtime.
//!
//! The device, its factory, the audio context and the script loader are all
//! supplied by the host page (or by test doubles). Nothing here knows how a
//! patch actually produces sound.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DeviceError, PatchError};
use crate::patch::{Dependency, PatchExport, PortDesc};

/// When a message event should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTime {
    /// As soon as possible.
    Now,
    /// Absolute device time in milliseconds.
    At(f64),
}

/// A tagged list of numbers sent to or from a device port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub time: EventTime,
    pub tag: String,
    pub payload: Vec<f64>,
}

impl MessageEvent {
    pub fn now(tag: impl Into<String>, payload: Vec<f64>) -> Self {
        MessageEvent {
            time: EventTime::Now,
            tag: tag.into(),
            payload,
        }
    }
}

impl fmt::Display for MessageEvent {
    /// `tag: v1,v2,...` — the readout format shown in the console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.tag)?;
        for (i, v) in self.payload.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Handle to a node in the host's audio graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputNode(pub u32);

/// Callback invoked for every message event a device emits.
pub type MessageCallback = Box<dyn FnMut(&MessageEvent)>;

/// A running patch instance.
pub trait Device {
    fn inports(&self) -> Vec<PortDesc>;
    fn outports(&self) -> Vec<PortDesc>;
    /// Route the device's audio output into `node`.
    fn connect(&mut self, node: &OutputNode) -> Result<(), DeviceError>;
    fn schedule_event(&mut self, event: MessageEvent);
    fn subscribe(&mut self, callback: MessageCallback);
    fn load_data_buffer_dependencies(&mut self, deps: &[Dependency]) -> Result<(), DeviceError>;
    /// Set a parameter by its id. Unknown ids are an error.
    fn set_parameter(&mut self, id: &str, value: f64) -> Result<(), DeviceError>;
}

/// What a factory receives alongside the patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceContext {
    pub sample_rate: u32,
}

/// Creates devices from patch exports.
#[allow(async_fn_in_trait)]
pub trait DeviceFactory {
    async fn create(
        &self,
        context: DeviceContext,
        patcher: &PatchExport,
    ) -> Result<Box<dyn Device>, DeviceError>;
}

/// The host audio graph.
pub trait AudioContext {
    fn sample_rate(&self) -> u32;
    /// Create a gain node already connected to the destination.
    fn create_output_node(&mut self) -> Result<OutputNode, DeviceError>;
    /// Leave the suspended state browsers start contexts in until a gesture.
    fn resume(&mut self) -> Result<(), DeviceError>;
}

/// Loads the runtime script for a given version.
#[allow(async_fn_in_trait)]
pub trait RuntimeLoader {
    fn is_loaded(&self) -> bool;
    async fn load(&mut self, version: &str, url: &str) -> Result<(), PatchError>;
}
