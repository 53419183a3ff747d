//! Command-line argument definitions for passport-cli.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use passport_core::BoundingBox;
use passport_utils::BoundsPolicySetting;

/// Check passport photo landmarks and plan canonical crops.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Optional settings JSON. Defaults to `config/passport_settings.json` when present, otherwise built-in parameters.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the output pixel density.
    #[arg(long, global = true, value_name = "PX")]
    pub pixels_per_mm: Option<u32>,

    /// Override the crop bounds policy (reject, pad).
    #[arg(long, global = true, value_name = "POLICY")]
    pub bounds: Option<BoundsPolicySetting>,

    /// Worker threads for batch checks (defaults to settings, then one per core).
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Enable telemetry timing logs (defaults to settings file).
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    pub telemetry: bool,

    /// Override telemetry logging level (error, warn, info, debug, trace).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub telemetry_level: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the geometric checks on landmark JSON extracted from canonical crops.
    Check(CheckArgs),
    /// Compute the canonical crop for a face box without touching any pixels.
    Plan(PlanArgs),
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Landmark JSON file, or a directory searched recursively for `*.json`.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the report to a JSON file instead of stdout.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Source photo width in pixels.
    #[arg(long)]
    pub width: u32,

    /// Source photo height in pixels.
    #[arg(long)]
    pub height: u32,

    /// Face box as `top,right,bottom,left`.
    #[arg(long, value_parser = parse_face_box, allow_hyphen_values = true)]
    pub face: BoundingBox,
}

fn parse_face_box(value: &str) -> Result<BoundingBox, String> {
    let parts: Vec<i32> = value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i32>()
                .map_err(|err| format!("invalid coordinate '{}': {err}", part.trim()))
        })
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        &[top, right, bottom, left] => Ok(BoundingBox::new(top, right, bottom, left)),
        _ => Err(format!(
            "expected 4 comma-separated values (top,right,bottom,left), got {}",
            parts.len()
        )),
    }
}
