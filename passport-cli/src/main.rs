mod args;
mod config;
mod input;
mod report;

use std::{
    fs::{self, File},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use passport_core::{BoundsPolicy, Calibration, Thresholds, VerifierBank, plan_crop};
use passport_utils::{AppSettings, init_logging, normalize_path, timing_guard};
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    args::{CheckArgs, CliArgs, Command, PlanArgs},
    config::{apply_cli_overrides, configure_telemetry_from, load_settings},
    input::collect_landmark_files,
    report::{FileReport, PlanReport, check_file},
};

fn main() -> Result<()> {
    init_logging(log::LevelFilter::Info)?;
    let args = CliArgs::parse();

    let mut settings = load_settings(args.global.config.as_ref())?;
    apply_cli_overrides(&mut settings, &args.global)?;
    configure_telemetry_from(&settings);

    match &args.command {
        Command::Check(check) => run_check(check, &settings),
        Command::Plan(plan) => run_plan(plan, &settings),
    }
}

fn run_check(args: &CheckArgs, settings: &AppSettings) -> Result<()> {
    let _guard = timing_guard("passport_cli::check", log::Level::Info);
    let input_path = normalize_path(&args.input)?;
    let files = collect_landmark_files(&input_path)?;
    if files.is_empty() {
        anyhow::bail!("no landmark JSON found at {}", input_path.display());
    }

    let bank = VerifierBank::new(
        Calibration::from(&settings.calibration),
        Thresholds::from(&settings.thresholds),
    );
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = settings.batch.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder.build().context("failed to build worker pool")?;

    info!("Checking {} landmark file(s)...", files.len());
    let reports: Vec<FileReport> =
        pool.install(|| files.par_iter().map(|path| check_file(path, &bank)).collect());

    let accepted = reports
        .iter()
        .filter(|r| matches!(r.status, report::Status::Accepted))
        .count();
    let errors = reports.iter().filter(|r| r.is_error()).count();
    info!(
        "{accepted} accepted, {} rejected, {errors} error(s)",
        reports.len() - accepted - errors
    );

    emit_json(&reports, args.json.as_ref())?;

    if errors > 0 {
        anyhow::bail!("{errors} landmark file(s) could not be checked");
    }
    Ok(())
}

fn run_plan(args: &PlanArgs, settings: &AppSettings) -> Result<()> {
    let calibration = Calibration::from(&settings.calibration);
    let plan = plan_crop(args.width, args.height, args.face, &calibration)?;
    let report = PlanReport::new(plan, &calibration, BoundsPolicy::from(&settings.crop));
    emit_json(&report, None)
}

fn emit_json<T: Serialize>(value: &T, path: Option<&PathBuf>) -> Result<()> {
    if let Some(json_path) = path {
        if let Some(dir) = json_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {}", dir.display()))?;
        }
        let file = File::create(json_path)
            .with_context(|| format!("failed to create {}", json_path.display()))?;
        serde_json::to_writer_pretty(file, value)
            .with_context(|| format!("failed to write report JSON to {}", json_path.display()))?;
        info!("Wrote report to {}", json_path.display());
    } else {
        let json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
        println!("{json}");
    }
    Ok(())
}
