use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use navdrop::{DropdownConfig, ViewportSize};
use serde::Serialize;
use tracing::info;

use crate::error::{DemoError, Result};
use crate::logging::init_tracing;
use crate::script::{self, TranscriptEntry};

#[derive(Debug, Parser)]
#[command(
    name = "navdrop-demo",
    about = "Replay scripted interactions against a headless navigation dropdown",
    version
)]
pub struct Cli {
    /// Built-in interaction script to replay.
    #[arg(long, value_enum, default_value_t = ScriptName::HoverTour)]
    pub script: ScriptName,

    /// Viewport height in CSS pixels; at or below the touch threshold hover
    /// is ignored.
    #[arg(long)]
    pub viewport_height: Option<f64>,

    /// Viewport width in CSS pixels.
    #[arg(long, default_value_t = 1280.0)]
    pub viewport_width: f64,

    /// TOML or JSON configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long)]
    pub json_logs: bool,

    /// Transcript format on stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScriptName {
    /// Pointer sweep across the bar and into the panel.
    HoverTour,
    /// Tap-driven session.
    Touch,
}

impl ScriptName {
    fn default_viewport_height(self) -> f64 {
        match self {
            Self::HoverTour => 800.0,
            Self::Touch => 560.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct JsonTranscript<'a> {
    script: &'a str,
    viewport: [f64; 2],
    initial: &'a [navdrop::AnimationCommand],
    steps: &'a [TranscriptEntry],
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli, &mut std::io::stdout().lock())
}

pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    init_tracing(cli.json_logs, "info");

    let config = match &cli.config {
        Some(path) => DropdownConfig::load(path)?,
        None => DropdownConfig::default(),
    };
    let height = cli
        .viewport_height
        .unwrap_or_else(|| cli.script.default_viewport_height());
    if !(height.is_finite() && height > 0.0 && cli.viewport_width.is_finite() && cli.viewport_width > 0.0) {
        return Err(DemoError::Usage(format!(
            "viewport must be positive, got {}x{height}",
            cli.viewport_width
        )));
    }
    let viewport = ViewportSize::new(cli.viewport_width, height);
    let steps = match cli.script {
        ScriptName::HoverTour => script::hover_tour(),
        ScriptName::Touch => script::touch(),
    };
    let name = match cli.script {
        ScriptName::HoverTour => "hover-tour",
        ScriptName::Touch => "touch",
    };
    info!(script = name, width = viewport.width, height = viewport.height, "replaying");

    let (initial, transcript) = script::run(&steps, viewport, config)?;
    match cli.format {
        OutputFormat::Json => {
            let doc = JsonTranscript {
                script: name,
                viewport: [viewport.width, viewport.height],
                initial: &initial,
                steps: &transcript,
            };
            serde_json::to_writer_pretty(&mut *out, &doc)?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_text(out, &initial, &transcript)?,
    }
    Ok(())
}

fn write_text(
    out: &mut impl Write,
    initial: &[navdrop::AnimationCommand],
    transcript: &[TranscriptEntry],
) -> Result<()> {
    writeln!(out, "[   0ms] mount")?;
    for command in initial {
        writeln!(out, "          {command}")?;
    }
    for entry in transcript {
        let marker = match (entry.panel.active, entry.panel.first_interaction) {
            (true, true) => " (open, first)",
            (true, false) => " (open)",
            (false, _) => "",
        };
        writeln!(out, "[{:>4}ms] {}{marker}", entry.at_ms, entry.step)?;
        for command in &entry.commands {
            writeln!(out, "          {command}")?;
        }
    }
    Ok(())
}
