//! The main entry point for the `treesub` command-line application.
//!
//! Parses arguments, installs logging, resolves configuration and hands the
//! run to the `treesub` library.

use anyhow::{Context, Result, anyhow};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::error;
use treesub::cli::{self, Args};
use treesub::config::{ConfigLoader, FileConfig};
use treesub::filter::TracingObserver;
use treesub::processor::{self, ProcessOptions};
use treesub::report::ReportFormatter;

fn main() -> ExitCode {
    let args = cli::parse_args();
    treesub::logging::init(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => {
            let resolved = ConfigLoader::find_config(path, &args.dir)?;
            ConfigLoader::load_file_config(&resolved)
                .with_context(|| format!("loading config file {}", resolved.display()))?
        }
        None => FileConfig::default(),
    };

    let pat_file = args
        .pat
        .clone()
        .or_else(|| file_config.pat.clone())
        .ok_or_else(|| anyhow!("missing required flag: --pat"))?;

    let filters = args
        .glob_lists()
        .or_file(&file_config)
        .build()
        .context("compiling glob filters")?;

    let options = ProcessOptions {
        dry_run: args.dry_run,
    };
    let summary = processor::run_replace(&pat_file, &args.dir, &filters, options, &mut TracingObserver)?;

    if summary.dry_run {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        ReportFormatter::new(args.format).write_output(&mut out, &summary)?;
        out.flush()?;
    }
    Ok(())
}
