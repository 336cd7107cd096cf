//! Resolution of the RNBO runtime script a patch needs.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::PatchError;

/// Public CDN serving `rnbo.min.js` per version.
pub const DEFAULT_RUNTIME_CDN: &str = "https://c74-public.nyc3.digitaloceanspaces.com/rnbo";

static DEBUG_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+-dev$").expect("static regex"));

/// True for versions of the form `x.y.z-dev`, which have no published runtime.
pub fn is_debug_version(version: &str) -> bool {
    DEBUG_VERSION.is_match(version)
}

/// URL of the runtime script for `version` under `cdn`.
pub fn runtime_script_url(cdn: &str, version: &str) -> Result<String, PatchError> {
    if is_debug_version(version) {
        return Err(PatchError::DebugVersion {
            version: version.to_string(),
        });
    }
    Ok(format!(
        "{}/{}/rnbo.min.js",
        cdn.trim_end_matches('/'),
        encode_uri_component(version)
    ))
}

/// Percent-encode everything outside the URI-component unreserved set.
fn encode_uri_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(b as char),
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}
