//! Spreadsheet parameter feed.
//!
//! Reads the latest row of a Google Sheets range and reduces it to the six
//! numeric parameters the patch exposes.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::device::Device;
use crate::error::{FetchError, SheetError};
use crate::fetch::Fetch;
use crate::ports::split_whitespace_runs;

pub const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
pub const DEFAULT_RANGE: &str = "Sheet1!A:M";

static LEADING_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?)(?:0[xX]([0-9a-fA-F]+)|([0-9]+))").expect("static regex"));

/// Which sheet to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    pub spreadsheet_id: String,
    pub api_key: String,
    #[serde(default = "default_range")]
    pub range: String,
}

fn default_range() -> String {
    DEFAULT_RANGE.to_string()
}

impl SheetConfig {
    /// Values API URL for this sheet.
    pub fn values_url(&self) -> String {
        format!(
            "{SHEETS_API}/{}/values/{}?key={}",
            self.spreadsheet_id, self.range, self.api_key
        )
    }
}

/// Body of a values API response. `values` is absent for an empty range.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl ValueRange {
    pub fn latest_row(&self) -> Result<&[String], SheetError> {
        self.values.last().map(Vec::as_slice).ok_or(SheetError::EmptySheet)
    }
}

/// Parameters derived from one sheet row. Field names serialize to the
/// parameter ids the patch declares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SheetParameters {
    pub age: f64,
    pub sex: f64,
    #[serde(rename = "totalLenght")]
    pub total_length: f64,
    #[serde(rename = "totalWords")]
    pub total_words: f64,
    pub symbol: f64,
    pub count: f64,
}

impl SheetParameters {
    /// Columns: A is age, B is sex; every cell counts toward the text
    /// statistics.
    pub fn from_row(row: &[String]) -> Result<Self, SheetError> {
        let age = row.first().map(|c| leading_int(c)).unwrap_or(0.0);
        let sex = match row.get(1).map(String::as_str) {
            Some("женский") => 0.0,
            Some("мужской") => 1.0,
            _ => 2.0,
        };
        let total_length: usize = row.iter().map(|c| c.encode_utf16().count()).sum();
        let total_words: usize = row.iter().map(|c| split_whitespace_runs(c).count()).sum();
        let (symbol, count) = most_used_symbol(&row.concat()).ok_or(SheetError::EmptyRow)?;

        Ok(SheetParameters {
            age,
            sex,
            total_length: total_length as f64,
            total_words: total_words as f64,
            symbol: symbol as u32 as f64,
            count: count as f64,
        })
    }

    /// `(parameter id, value)` pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("age", self.age),
            ("sex", self.sex),
            ("totalLenght", self.total_length),
            ("totalWords", self.total_words),
            ("symbol", self.symbol),
            ("count", self.count),
        ]
    }

    /// Write every value onto `device`. Stops at the first unknown id.
    pub fn apply_to(&self, device: &mut dyn Device) -> Result<(), SheetError> {
        for (id, value) in self.entries() {
            device.set_parameter(id, value)?;
        }
        info!(params = ?self, "sheet parameters applied");
        Ok(())
    }
}

/// Leading integer of `s`, 0 when it has none. A `0x` prefix reads the
/// digits as hex.
fn leading_int(s: &str) -> f64 {
    let Some(caps) = LEADING_INT.captures(s) else {
        return 0.0;
    };
    let magnitude = match (caps.get(2), caps.get(3)) {
        (Some(hex), _) => hex
            .as_str()
            .chars()
            .filter_map(|c| c.to_digit(16))
            .fold(0.0, |acc, d| acc * 16.0 + d as f64),
        (None, Some(dec)) => dec.as_str().parse::<f64>().unwrap_or(0.0),
        (None, None) => 0.0,
    };
    if &caps[1] == "-" { -magnitude } else { magnitude }
}

/// Most frequent character and its count. Ties go to the first character in
/// enumeration order: ASCII digits first in ascending order, then everything
/// else in order of first appearance.
fn most_used_symbol(text: &str) -> Option<(char, usize)> {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut order: Vec<char> = Vec::new();
    for ch in text.chars() {
        let n = counts.entry(ch).or_insert(0);
        if *n == 0 {
            order.push(ch);
        }
        *n += 1;
    }

    let mut digits: Vec<char> = order.iter().copied().filter(char::is_ascii_digit).collect();
    digits.sort_unstable();
    let rest = order.iter().copied().filter(|c| !c.is_ascii_digit());

    let mut best: Option<(char, usize)> = None;
    for ch in digits.into_iter().chain(rest) {
        let n = counts[&ch];
        if best.is_none_or(|(_, max)| n > max) {
            best = Some((ch, n));
        }
    }
    best
}

/// Fetch the sheet and return its last row.
pub async fn fetch_latest_row<F: Fetch>(fetch: &F, config: &SheetConfig) -> Result<Vec<String>, SheetError> {
    let response = fetch.get(&config.values_url()).await?;
    if !response.is_success() {
        return Err(FetchError::HttpStatus {
            status: response.status,
        }
        .into());
    }
    let values: ValueRange = response.json()?;
    debug!(range = %values.range, rows = values.values.len(), "sheet fetched");
    Ok(values.latest_row()?.to_vec())
}

/// Fetch the latest row, derive parameters and apply them to `device`.
pub async fn load_sheet<F: Fetch>(
    fetch: &F,
    config: &SheetConfig,
    device: &mut dyn Device,
) -> Result<SheetParameters, SheetError> {
    let row = fetch_latest_row(fetch, config).await?;
    let params = SheetParameters::from_row(&row)?;
    params.apply_to(device)?;
    Ok(params)
}
