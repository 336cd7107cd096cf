pub mod app;
pub mod audio;
pub mod config;
pub mod device;
pub mod error;
pub mod fetch;
#[cfg(feature = "native")]
pub mod net;
pub mod patch;
pub mod ports;
pub mod presenter;
pub mod sheet;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::audio::capture::{Capture, CaptureConfig, OUTPUT_FILE_NAME, OUTPUT_MIME};
use crate::patch::{Dependency, DEFAULT_RUNTIME_CDN};
use crate::sheet::SheetParameters;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_err)
}

/// WASM-exposed: return the rnbo_host version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// WASM-exposed: encode two channels to a 16-bit stereo WAV byte array.
#[wasm_bindgen]
pub fn encode_wav(left: &[f32], right: &[f32], sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    audio::encode_wav(left, right, sample_rate).map_err(js_err)
}

/// WASM-exposed: runtime script URL for a patch's RNBO version.
#[wasm_bindgen]
pub fn rnbo_script_url(version: &str) -> Result<String, JsValue> {
    patch::runtime_script_url(DEFAULT_RUNTIME_CDN, version).map_err(js_err)
}

/// WASM-exposed: prefix `file` paths of a dependency manifest with `dir`.
#[wasm_bindgen]
pub fn rewrite_dependencies(manifest: JsValue, dir: &str) -> Result<JsValue, JsValue> {
    let deps: Vec<Dependency> = serde_wasm_bindgen::from_value(manifest)?;
    to_js(&patch::rewrite_dependencies(deps, dir))
}

/// WASM-exposed: split inport text into message values.
#[wasm_bindgen]
pub fn parse_inport_values(text: &str) -> Vec<f64> {
    ports::parse_inport_values(text)
}

/// WASM-exposed: derive `{age, sex, totalLenght, totalWords, symbol, count}`
/// from a sheet row (array of strings).
#[wasm_bindgen]
pub fn sheet_parameters(row: JsValue) -> Result<JsValue, JsValue> {
    let row: Vec<String> = serde_wasm_bindgen::from_value(row)?;
    to_js(&SheetParameters::from_row(&row).map_err(js_err)?)
}

/// WASM-exposed: fixed-window recorder fed from an audio callback.
///
/// `push` is called per chunk and `timeout` from a timer; the first of them
/// to finish the recording returns the WAV bytes, every other call returns
/// `undefined`.
#[wasm_bindgen]
pub struct WavCapture {
    inner: Capture,
}

#[wasm_bindgen]
impl WavCapture {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: u32, duration_secs: u32) -> Result<WavCapture, JsValue> {
        let inner = Capture::new(CaptureConfig::new(sample_rate, duration_secs)).map_err(js_err)?;
        Ok(WavCapture { inner })
    }

    pub fn push(&mut self, left: &[f32], right: &[f32]) -> Result<Option<Vec<u8>>, JsValue> {
        let rec = self.inner.push(left, right).map_err(js_err)?;
        Ok(rec.map(|r| r.wav))
    }

    pub fn timeout(&mut self) -> Result<Option<Vec<u8>>, JsValue> {
        let rec = self.inner.timeout().map_err(js_err)?;
        Ok(rec.map(|r| r.wav))
    }

    /// Advance the countdown by one second; returns seconds remaining.
    pub fn tick(&mut self) -> u32 {
        self.inner.tick()
    }

    #[wasm_bindgen(getter)]
    pub fn remaining_secs(&self) -> u32 {
        self.inner.remaining_secs()
    }

    #[wasm_bindgen(getter)]
    pub fn finalized(&self) -> bool {
        self.inner.is_finalized()
    }

    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        OUTPUT_FILE_NAME.to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        OUTPUT_MIME.to_string()
    }
}
