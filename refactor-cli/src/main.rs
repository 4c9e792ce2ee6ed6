use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use refactor::{
    config::ConfigOverrides,
    confirm::LineGate,
    lister::FileLister,
    report::Reporter,
    Refactor, RefactorConfig, SearchSpec,
};
use std::io::{self, IsTerminal, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Replace literal text across many files, previewing before anything is written
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Text to search for (literal, case-sensitive)
    old: String,

    /// Text to replace it with
    new: String,

    /// Files to process; walks the current directory when none are given
    files: Vec<PathBuf>,

    /// Write the changes after confirmation instead of only previewing them
    #[arg(short = 'x', long)]
    execute: bool,

    /// Number of files processed at once
    #[arg(short = 'j', long)]
    concurrency: Option<NonZeroUsize>,

    /// Configuration file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Print the scan aggregate as JSON instead of the preview
    #[arg(long, conflicts_with = "execute")]
    json: bool,

    /// Show progress bars on stderr
    #[arg(long)]
    progress: bool,

    /// Honor .gitignore and skip hidden files when walking
    #[arg(long)]
    respect_ignore: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            concurrency: self.concurrency,
            log_level: self.log_level.clone(),
            no_color: self.no_color,
            progress: self.progress,
            respect_ignore: self.respect_ignore,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Returns whether the run succeeded in the sense of the exit status.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    let config = RefactorConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?
        .merge_with_cli(cli.overrides());
    init_tracing(&config.log_level);
    debug!("Effective configuration: {:?}", config);

    let color = config.color && io::stdout().is_terminal();
    colored::control::set_override(color);

    let spec = SearchSpec::new(cli.old, cli.new, cli.execute);
    let reporter = Reporter::new(&spec, color);

    let listing = FileLister::from_args(cli.files, config.respect_ignore).list();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut refactor = Refactor::new(&config)?;

    if cli.json {
        // stdout carries nothing but the JSON document.
        let mut err = io::stderr().lock();
        reporter.listing_errors(&mut err, &listing.errors)?;
        if spec.is_noop() {
            reporter.noop(&mut err)?;
            return Ok(false);
        }
        let aggregate = refactor.scan(&spec, &listing.candidates)?;
        aggregate.write_json(&mut out)?;
        return Ok(!aggregate.is_empty());
    }

    reporter.listing_errors(&mut out, &listing.errors)?;
    let mut gate = LineGate::stdin();
    let outcome = refactor.run(&spec, &listing.candidates, &reporter, &mut gate, &mut out)?;
    out.flush()?;
    debug!("Run finished in state {:?}", outcome.final_state());

    Ok(outcome.is_success())
}
