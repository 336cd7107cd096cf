//! Inport message entry and the outport console.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::device::{Device, MessageEvent};
use crate::presenter::Presenter;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)").expect("static regex")
});

/// Split on runs of whitespace, keeping the empty pieces a leading or
/// trailing run produces.
pub(crate) fn split_whitespace_runs(text: &str) -> impl Iterator<Item = &str> {
    WHITESPACE.split(text)
}

/// Parse the longest numeric prefix of `s`; NaN when there is none.
pub fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    FLOAT_PREFIX
        .find(s)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Turn typed inport text into message values. Messages carry numbers only,
/// so non-numeric pieces become NaN.
pub fn parse_inport_values(text: &str) -> Vec<f64> {
    split_whitespace_runs(text).map(parse_float_prefix).collect()
}

// ── Inport form ─────────────────────────────────────────────

/// State behind the inport selector and text box.
#[derive(Debug, Clone)]
pub struct InportForm {
    tags: Vec<String>,
    selected: usize,
}

impl InportForm {
    /// Build the form for a device. `None` when the device has no inports.
    pub fn for_device(device: &dyn Device) -> Option<Self> {
        let tags: Vec<String> = device.inports().into_iter().map(|p| p.tag).collect();
        if tags.is_empty() {
            debug!("device has no inports");
            return None;
        }
        Some(InportForm { tags, selected: 0 })
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn selected(&self) -> &str {
        &self.tags[self.selected]
    }

    /// Select an inport by tag. Returns false for unknown tags.
    pub fn select(&mut self, tag: &str) -> bool {
        match self.tags.iter().position(|t| t == tag) {
            Some(i) => {
                self.selected = i;
                true
            }
            None => false,
        }
    }

    /// Build the event a form submission sends.
    pub fn message(&self, text: &str) -> MessageEvent {
        MessageEvent::now(self.selected(), parse_inport_values(text))
    }

    /// Parse `text` and schedule it on the selected inport.
    pub fn submit(&self, device: &mut dyn Device, text: &str) {
        let event = self.message(text);
        debug!(tag = %event.tag, values = ?event.payload, "scheduling inport message");
        device.schedule_event(event);
    }
}

// ── Outport console ─────────────────────────────────────────

/// Subscribe to `device` and mirror outport events to `presenter`.
///
/// Returns false (and subscribes nothing) when the device has no outports.
pub fn attach_outports<P: Presenter + 'static>(
    device: &mut dyn Device,
    presenter: Rc<RefCell<P>>,
) -> bool {
    let outports: Vec<String> = device.outports().into_iter().map(|p| p.tag).collect();
    if outports.is_empty() {
        debug!("device has no outports");
        return false;
    }

    device.subscribe(Box::new(move |ev: &MessageEvent| {
        // Inlet/outlet traffic and unknown tags are not shown.
        if !outports.iter().any(|t| *t == ev.tag) {
            return;
        }
        let line = ev.to_string();
        info!("{line}");
        presenter.borrow_mut().show_readout(&line);
    }));
    true
}
