//! rnbo-host CLI - inspect patch exports, preview sheet parameters, and
//! exercise the capture pipeline without a browser.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;
use tokio::sync::{mpsc, watch};
use tracing::info;

use rnbo_host::audio::capture::{Capture, CaptureConfig};
use rnbo_host::audio::recorder::{record, AudioChunk};
use rnbo_host::config::AppConfig;
use rnbo_host::fetch::Fetch;
use rnbo_host::net::HttpFetcher;
use rnbo_host::patch::{parse_manifest, rewrite_dependencies, runtime_script_url, PatchExport};
use rnbo_host::sheet::{fetch_latest_row, SheetParameters};

/// Frames per chunk, the size of a Web Audio render quantum.
const CHUNK_FRAMES: usize = 128;

#[derive(Parser)]
#[command(name = "rnbo-host")]
#[command(about = "Host tools for exported RNBO patches", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL relative export paths are resolved against
    #[arg(short, long, global = true)]
    base: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a patch export and list its runtime, ports, parameters and dependencies
    Inspect,
    /// Fetch the configured spreadsheet and print the derived parameters
    Sheet,
    /// Record a sine tone through the capture pipeline to rnbo_output.wav
    Tone {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Tone frequency in Hz
        #[arg(short, long, default_value = "440.0")]
        freq: f32,

        /// Tone length in seconds; the capture window still applies
        #[arg(short, long, default_value = "2.0")]
        seconds: f32,

        /// Sample rate in Hz
        #[arg(short, long, default_value = "44100")]
        rate: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref())?;
    let fetcher = HttpFetcher::new(cli.base);

    match cli.command {
        Commands::Inspect => inspect(&config, &fetcher).await,
        Commands::Sheet => sheet(&config, &fetcher).await,
        Commands::Tone {
            out,
            freq,
            seconds,
            rate,
        } => tone(&config, out, freq, seconds, rate).await,
    }
}

async fn inspect(config: &AppConfig, fetcher: &HttpFetcher) -> Result<()> {
    let response = fetcher.get(&config.patch_export_url).await?;
    if !response.is_success() {
        anyhow::bail!(
            "Couldn't load patcher export bundle from {} (status {})",
            config.patch_export_url,
            response.status
        );
    }
    let patch = PatchExport::from_slice(&response.body).context("parsing patch export")?;

    println!("RNBO version: {}", patch.rnbo_version());
    match runtime_script_url(&config.runtime_cdn, patch.rnbo_version()) {
        Ok(url) => println!("Runtime:      {url}"),
        Err(e) => println!("Runtime:      unavailable ({e})"),
    }

    println!("Inports:");
    for p in &patch.desc.inports {
        println!("  {}", p.tag);
    }
    println!("Outports:");
    for p in &patch.desc.outports {
        println!("  {}", p.tag);
    }
    println!("Parameters:");
    for p in &patch.desc.parameters {
        let range = match (p.minimum, p.maximum) {
            (Some(lo), Some(hi)) => format!("[{lo}, {hi}]"),
            _ => String::new(),
        };
        println!("  {} {range}", p.param_id);
    }

    let deps = match fetcher.get(&config.dependencies_url).await {
        Ok(r) => parse_manifest(&r.body).unwrap_or_default(),
        Err(_) => Vec::new(),
    };
    println!("Dependencies:");
    for d in rewrite_dependencies(deps, &config.export_dir) {
        let id = d.id.as_deref().unwrap_or("?");
        let location = d.file.as_deref().or(d.url.as_deref()).unwrap_or("-");
        println!("  {id}: {location}");
    }
    Ok(())
}

async fn sheet(config: &AppConfig, fetcher: &HttpFetcher) -> Result<()> {
    let sheet = config
        .sheet
        .as_ref()
        .context("no [sheet] section in the configuration")?;
    let row = fetch_latest_row(fetcher, sheet).await?;
    let params = SheetParameters::from_row(&row)?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}

async fn tone(config: &AppConfig, out: PathBuf, freq: f32, seconds: f32, rate: u32) -> Result<()> {
    let capture = Capture::new(CaptureConfig::new(rate, config.capture.duration_secs))?;
    let (tx, rx) = mpsc::channel(64);
    let (progress_tx, mut progress_rx) = watch::channel(config.capture.duration_secs);

    let total = (seconds.max(0.0) * rate as f32) as usize;
    let producer = tokio::spawn(async move {
        let step = std::f32::consts::TAU * freq / rate as f32;
        let mut n = 0usize;
        while n < total {
            let len = CHUNK_FRAMES.min(total - n);
            let left: Vec<f32> = (n..n + len).map(|i| 0.5 * (step * i as f32).sin()).collect();
            let right = left.clone();
            if tx.send(AudioChunk::new(left, right)).await.is_err() {
                break;
            }
            n += len;
        }
    });

    let progress = tokio::spawn(async move {
        while progress_rx.changed().await.is_ok() {
            info!(remaining = *progress_rx.borrow_and_update(), "recording");
        }
    });

    let recording = record(capture, rx, progress_tx).await?;
    producer.await?;
    progress.await?;

    let path = recording.save(&out)?;
    println!(
        "Wrote {} ({} frames, {:.2}s, {})",
        path.display(),
        recording.frames,
        recording.duration_secs(),
        recording.mime_type()
    );
    Ok(())
}
