mod output;

use anyhow::{Context, Result};
use clap::Parser;
use output::{OutputWriter, RegisterOutput};
use pbxreg_core::{Project, register_paths};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter.
const LOG_ENV: &str = "PBXREG_LOG";

/// Exit code for failures while loading the project.
const EXIT_LOAD: u8 = 1;

/// Exit code for failures while saving the project.
const EXIT_SAVE: u8 = 2;

/// pbxreg - register generated files in an Xcode project
#[derive(Parser)]
#[command(name = "pbxreg")]
#[command(
    about = "Add files to an Xcode project, creating groups that mirror their directories",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Project bundle (.xcodeproj) or its project.pbxproj file
    project: PathBuf,

    /// Files to register, relative to the project's main group
    paths: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Register in memory but do not save
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = OutputWriter::new(cli.json);
    match run(&cli, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = result_code(&err);
            output.write_error(&err, code);
            ExitCode::from(code)
        }
    }
}

/// Log to stderr so stdout stays clean for `--json`.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "pbxreg=debug,pbxreg_core=debug"
    } else {
        "pbxreg=warn,pbxreg_core=warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn run(cli: &Cli, output: &OutputWriter) -> Result<()> {
    let mut project = Project::open(&cli.project)
        .with_context(|| format!("Failed to open project at {}", cli.project.display()))?;

    debug!(
        project = %project.path().display(),
        paths = cli.paths.len(),
        "Registering paths"
    );

    let report = register_paths(&mut project, &cli.paths)
        .with_context(|| format!("Failed to register paths in {}", cli.project.display()))?;

    if cli.dry_run {
        info!("Dry run, skipping save");
    } else {
        project
            .save()
            .with_context(|| format!("Failed to save {}", project.path().display()))?;
    }

    let data = RegisterOutput::new(cli.project.display().to_string(), !cli.dry_run, report);
    output.write(&data, || data.to_text())
}

/// Map an error to the process exit code.
fn result_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<pbxreg_core::Error>() {
        Some(e) if e.is_save() => EXIT_SAVE,
        _ => EXIT_LOAD,
    }
}
