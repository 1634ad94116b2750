//! # lottie-keypaths
//!
//! Runs one animation setup pass over a Lottie file and prints what it saw:
//! every property keypath, the compatibility report and the master clock.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lottie_core::{
    AnimationKeypath, CompatibilityMode, CompositionDriver, DefaultTextProvider, LoopMode,
    LottieAsset, PlaybackOptions, SetupReport, ValueProviderStore,
};
use lottie_data::model::LottieJson;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "lottie-keypaths")]
#[command(about = "List the animatable keypaths and compatibility issues of a Lottie file")]
#[command(version)]
struct Cli {
    /// Path to the Lottie JSON file
    file: PathBuf,

    /// Fail on the first compatibility issue instead of reporting it
    #[arg(long)]
    strict: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Only list keypaths matching this pattern (`*` and `**` wildcards)
    #[arg(short, long)]
    filter: Option<String>,

    /// First frame of the playback window
    #[arg(long)]
    from: Option<f32>,

    /// Last frame of the playback window
    #[arg(long)]
    to: Option<f32>,

    #[arg(long, value_enum, default_value = "once")]
    loop_mode: LoopArg,

    #[arg(long, default_value = "1.0")]
    speed: f32,

    /// Leave failing root layers empty and keep going
    #[arg(long)]
    skip_failed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LoopArg {
    Once,
    Loop,
    PingPong,
}

impl Cli {
    fn playback_options(&self) -> PlaybackOptions {
        PlaybackOptions {
            from_frame: self.from,
            to_frame: self.to,
            loop_mode: match self.loop_mode {
                LoopArg::Once => LoopMode::PlayOnce,
                LoopArg::Loop => LoopMode::Loop,
                LoopArg::PingPong => LoopMode::PingPong,
            },
            speed: self.speed,
            compatibility_mode: if self.strict {
                CompatibilityMode::Abort
            } else {
                CompatibilityMode::Track
            },
            skip_failed_layers: self.skip_failed,
        }
    }
}

fn load_asset(path: &Path) -> Result<Arc<LottieAsset>> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let model: LottieJson = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing {} as Lottie JSON", path.display()))?;
    Ok(Arc::new(LottieAsset::from_model(model)))
}

fn setup(cli: &Cli, asset: Arc<LottieAsset>) -> Result<SetupReport> {
    let mut driver = CompositionDriver::new(asset);
    let report = driver
        .setup_animations(
            &cli.playback_options(),
            &ValueProviderStore::new(),
            &DefaultTextProvider,
        )
        .context("animation setup failed")?;
    Ok(report)
}

fn filter_keypaths(report: &mut SetupReport, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        let pattern = AnimationKeypath::parse(pattern);
        report.keypaths.retain(|keypath| pattern.matches(keypath));
    }
}

fn render_text(report: &SetupReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Keypaths ({}):", report.keypaths.len());
    for keypath in &report.keypaths {
        let _ = writeln!(out, "  • {keypath}");
    }

    let _ = writeln!(out, "\nCompatibility issues ({}):", report.issues.len());
    for issue in &report.issues {
        let _ = writeln!(out, "  • {issue}");
    }

    if !report.failed_layers.is_empty() {
        let _ = writeln!(out, "\nFailed layers ({}):", report.failed_layers.len());
        for failed in &report.failed_layers {
            let _ = writeln!(out, "  • {}: {}", failed.name, failed.error);
        }
    }

    let clock = &report.clock;
    let _ = writeln!(
        out,
        "\nMaster clock: frames {} → {} over {:.3}s (speed {}, repeat {}, autoreverse {})",
        clock.from_frame,
        clock.to_frame,
        clock.duration,
        clock.timing.speed,
        clock.timing.repeat_count,
        clock.timing.autoreverses,
    );
    out
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let asset = load_asset(&cli.file)?;
    tracing::info!(
        file = %cli.file.display(),
        layers = asset.model.layers.len(),
        "loaded animation"
    );

    let mut report = setup(&cli, asset)?;
    filter_keypaths(&mut report, cli.filter.as_deref());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}
