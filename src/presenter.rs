//! Presentation seam: everything the page shows goes through [`Presenter`].

/// Display surface for the host page.
pub trait Presenter {
    /// Latest outport readout, e.g. `level: 0.5`.
    fn show_readout(&mut self, text: &str);
    /// Seconds left on an armed capture.
    fn show_countdown(&mut self, remaining_secs: u32);
    /// Offer a finished file to the user.
    fn offer_download(&mut self, file_name: &str, mime: &str, bytes: &[u8]);
}

/// Presenter that only records what it was told. Used by the CLI and tests.
#[derive(Debug, Default, Clone)]
pub struct TextPresenter {
    pub readout: Option<String>,
    pub countdown: Option<u32>,
    pub downloads: Vec<(String, String, usize)>,
}

impl Presenter for TextPresenter {
    fn show_readout(&mut self, text: &str) {
        self.readout = Some(text.to_string());
    }

    fn show_countdown(&mut self, remaining_secs: u32) {
        self.countdown = Some(remaining_secs);
    }

    fn offer_download(&mut self, file_name: &str, mime: &str, bytes: &[u8]) {
        self.downloads
            .push((file_name.to_string(), mime.to_string(), bytes.len()));
    }
}
