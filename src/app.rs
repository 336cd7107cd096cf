//! Session setup: fetch the patch, make sure the runtime is present, create
//! the device and wire it into the audio graph.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::device::{AudioContext, Device, DeviceContext, DeviceFactory, OutputNode, RuntimeLoader};
use crate::error::{DeviceError, FetchError, PatchError, SetupError, SheetError};
use crate::fetch::Fetch;
use crate::patch::{parse_manifest, rewrite_dependencies, runtime_script_url, Dependency, PatchExport};
use crate::ports::{attach_outports, InportForm};
use crate::presenter::Presenter;
use crate::sheet::{load_sheet, SheetConfig, SheetParameters};

/// What the diagnostic overlay is given when setup fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub error: String,
    pub header: Option<String>,
    pub description: Option<String>,
}

impl ErrorReport {
    fn plain(error: &SetupError) -> Self {
        ErrorReport {
            error: error.to_string(),
            header: None,
            description: None,
        }
    }
}

/// Optional diagnostic overlay. When one is installed, setup failures are
/// reported to it instead of being returned.
pub trait Guardrails {
    fn report(&mut self, report: ErrorReport);
    /// Setup finished without errors.
    fn ready(&mut self);
}

/// A device wired into the audio graph.
pub struct Session {
    pub patch: PatchExport,
    pub device: Box<dyn Device>,
    pub output: OutputNode,
    pub dependencies: Vec<Dependency>,
}

impl Session {
    pub fn inport_form(&self) -> Option<InportForm> {
        InportForm::for_device(self.device.as_ref())
    }

    pub fn attach_console<P: Presenter + 'static>(&mut self, presenter: Rc<RefCell<P>>) -> bool {
        attach_outports(self.device.as_mut(), presenter)
    }

    pub async fn load_sheet<F: Fetch>(
        &mut self,
        fetch: &F,
        config: &SheetConfig,
    ) -> Result<SheetParameters, SheetError> {
        let params = load_sheet(fetch, config, self.device.as_mut()).await?;
        for (id, value) in params.entries() {
            let declared = self.patch.desc.parameters.iter().find(|p| p.param_id == id);
            if let Some(p) = declared.filter(|p| p.clamp(value) != value) {
                warn!(id, value, min = ?p.minimum, max = ?p.maximum, "sheet value outside parameter range");
            }
        }
        Ok(params)
    }
}

struct PatchFailure {
    error: SetupError,
    /// Set when the descriptor request came back with a non-2xx status.
    status: Option<u16>,
}

impl From<FetchError> for PatchFailure {
    fn from(e: FetchError) -> Self {
        PatchFailure {
            error: e.into(),
            status: None,
        }
    }
}

impl From<PatchError> for PatchFailure {
    fn from(e: PatchError) -> Self {
        PatchFailure {
            error: e.into(),
            status: None,
        }
    }
}

async fn load_patch<F: Fetch, R: RuntimeLoader>(
    config: &AppConfig,
    fetch: &F,
    runtime: &mut R,
) -> Result<PatchExport, PatchFailure> {
    let response = fetch.get(&config.patch_export_url).await?;
    let status = (!response.is_success()).then_some(response.status);
    let patch = PatchExport::from_slice(&response.body).map_err(|e| PatchFailure {
        error: e.into(),
        status,
    })?;

    if !runtime.is_loaded() {
        let version = patch.rnbo_version();
        let url = runtime_script_url(&config.runtime_cdn, version)?;
        info!(version, %url, "loading runtime script");
        runtime.load(version, &url).await?;
    }
    Ok(patch)
}

/// Fetch and rewrite the dependency manifest. Any failure means "no
/// dependencies".
async fn load_dependencies<F: Fetch>(config: &AppConfig, fetch: &F) -> Vec<Dependency> {
    let body = match fetch.get(&config.dependencies_url).await {
        Ok(response) => response.body,
        Err(e) => {
            debug!(error = %e, "no dependency manifest");
            return Vec::new();
        }
    };
    match parse_manifest(&body) {
        Ok(deps) => rewrite_dependencies(deps, &config.export_dir),
        Err(e) => {
            debug!(error = %FetchError::from(e), "unreadable dependency manifest");
            Vec::new()
        }
    }
}

fn fail(
    guardrails: Option<&mut dyn Guardrails>,
    report: ErrorReport,
    error: SetupError,
) -> Result<Option<Session>, SetupError> {
    match guardrails {
        Some(g) => {
            warn!(error = %error, "setup failed");
            g.report(report);
            Ok(None)
        }
        None => Err(error),
    }
}

/// Build a [`Session`].
///
/// Returns `Ok(None)` when a failure was handed to `guardrails`, and `Err`
/// for the same failures when no overlay is installed.
pub async fn setup<F, R, D, C>(
    config: &AppConfig,
    fetch: &F,
    runtime: &mut R,
    factory: &D,
    context: &mut C,
    guardrails: Option<&mut dyn Guardrails>,
) -> Result<Option<Session>, SetupError>
where
    F: Fetch,
    R: RuntimeLoader,
    D: DeviceFactory,
    C: AudioContext,
{
    let output = context.create_output_node()?;

    let patch = match load_patch(config, fetch, runtime).await {
        Ok(patch) => patch,
        Err(PatchFailure { error, status }) => {
            let mut report = ErrorReport::plain(&error);
            if status.is_some() {
                report.header = Some("Couldn't load patcher export bundle".to_string());
                report.description = Some(format!(
                    "Check the configuration to see what file it's trying to load. Currently it's \
                     trying to load \"{}\". If that doesn't match the name of the file you exported \
                     from RNBO, modify patch_export_url.",
                    config.patch_export_url
                ));
            }
            return fail(guardrails, report, error);
        }
    };

    let dependencies = load_dependencies(config, fetch).await;

    let device_context = DeviceContext {
        sample_rate: context.sample_rate(),
    };
    let mut device = match factory.create(device_context, &patch).await {
        Ok(device) => device,
        Err(e) => {
            let error = SetupError::from(e);
            return fail(guardrails, ErrorReport::plain(&error), error);
        }
    };

    if !dependencies.is_empty() {
        device.load_data_buffer_dependencies(&dependencies)?;
    }
    device.connect(&output)?;
    info!(
        version = patch.rnbo_version(),
        dependencies = dependencies.len(),
        "device connected"
    );

    if let Some(g) = guardrails {
        g.ready();
    }

    Ok(Some(Session {
        patch,
        device,
        output,
        dependencies,
    }))
}

/// Resume the audio graph from a user gesture (the page wires this to a
/// click anywhere on the body). Safe to call repeatedly.
pub fn resume_audio<C: AudioContext + ?Sized>(context: &mut C) -> Result<(), DeviceError> {
    context.resume()?;
    debug!(sample_rate = context.sample_rate(), "audio context resumed");
    Ok(())
}
