//! CLI command for a full replacement run

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, bail};

use crate::cli::progress::{StageDisplay, print_done};
use crate::config::WemVoiceConfig;
use crate::pipeline::{self, PipelineOptions, RunReport};
use crate::replace::ReplacementOutcome;
use crate::report::write_run_logs;
use crate::scan::CancelToken;

/// Log folder used when neither the command line nor the config names one
const DEFAULT_LOG_DIR: &str = "logs";

/// Arguments of `wemvoice run`
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub descriptors: Option<PathBuf>,
    pub voices: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub logs: Option<PathBuf>,
    pub no_logs: bool,
    pub jobs: Option<usize>,
    pub json: bool,
    pub quiet: bool,
}

fn require(
    arg: Option<&PathBuf>,
    config: Option<&PathBuf>,
    flag: &str,
    key: &str,
) -> anyhow::Result<PathBuf> {
    match arg.or(config) {
        Some(path) => Ok(path.clone()),
        None => bail!("missing {flag} (or paths.{key} in the config file)"),
    }
}

/// Execute `wemvoice run`
pub fn execute(args: &RunArgs) -> anyhow::Result<()> {
    let config = WemVoiceConfig::load_or_default(args.config.as_deref())
        .context("could not load configuration")?;

    let descriptors = require(
        args.descriptors.as_ref(),
        config.paths.descriptors.as_ref(),
        "--descriptors",
        "descriptors",
    )?;
    let voices = require(args.voices.as_ref(), config.paths.voices.as_ref(), "--voices", "voices")?;
    let output = require(args.output.as_ref(), config.paths.output.as_ref(), "--output", "output")?;

    let options =
        PipelineOptions::new(descriptors, voices, output).with_substitutions(config.substitutions);

    let log_dir = if args.no_logs {
        None
    } else {
        Some(
            args.logs
                .clone()
                .or(config.paths.logs)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
        )
    };

    let quiet = args.quiet || args.json;
    let start = Instant::now();
    let display = StageDisplay::new(quiet);
    let cancel = CancelToken::new();
    cancel_on_ctrl_c(&cancel);

    let report = match args.jobs {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("could not start worker pool")?;
            pool.install(|| pipeline::run(&options, &cancel, |p| display.update(p)))
        }
        None => pipeline::run(&options, &cancel, |p| display.update(p)),
    };
    display.finish();
    let report = report?;

    if let Some(dir) = log_dir {
        let files = write_run_logs(&report, &dir)
            .with_context(|| format!("could not write logs to {}", dir.display()))?;
        if !quiet {
            println!("Logs written to {}", dir.display());
            tracing::debug!("Missing list: {}", files.missing.display());
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    } else {
        print_summary(&report, &options.output_root);
        if !quiet {
            print_done(start.elapsed());
        }
    }

    Ok(())
}

/// Cancel `cancel` on the first Ctrl+C, exit on the second.
///
/// Copies already under way finish; nothing new is started.
fn cancel_on_ctrl_c(cancel: &CancelToken) {
    let cancel = cancel.clone();
    let spawned = std::thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::warn!("Ctrl+C handling unavailable: {}", e);
                    return;
                }
            };
            runtime.block_on(wait_for_ctrl_c(&cancel));
        });

    if let Err(e) = spawned {
        tracing::warn!("Ctrl+C handling unavailable: {}", e);
    }
}

async fn wait_for_ctrl_c(cancel: &CancelToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to install Ctrl+C handler: {}", e);
        return;
    }
    eprintln!("Cancelling after the files in progress (Ctrl+C again to quit)");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(130);
    }
}

fn print_summary(report: &RunReport, output: &Path) {
    let summary = report.summary();

    println!();
    println!("Replacement complete:");
    println!("  Descriptors: {} ({} degraded)", summary.descriptors, summary.degraded);
    println!("  Voice files: {} ({} key collisions)", summary.voices, summary.collisions);
    println!("  Found:       {}", summary.found);
    println!("  Missing:     {}", summary.missing);
    println!("  Copied:      {} -> {}", summary.copied, output.display());

    if summary.skipped > 0 {
        println!("  Skipped:     {}", summary.skipped);
    }
    if summary.failed > 0 {
        println!("  Failed:      {}", summary.failed);
        println!();
        println!("Errors:");
        for (descriptor, _, outcome) in report.entries() {
            if let ReplacementOutcome::Failed { error, .. } = outcome {
                println!("  {}: {}", descriptor.file_name(), error);
            }
        }
    }
}
