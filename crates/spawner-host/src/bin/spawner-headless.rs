//! Headless runner: loads scenarios, runs them, prints a summary.
//!
//! Run with: `cargo run --package spawner-host --bin spawner-headless`

use clap::Parser;
use spawner_host::scenario::{load_scenario, run_scenario, scenario_files};
use spawner_host::settings::{HostSettings, load_settings};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Run generator scenarios without a game host.
#[derive(Parser)]
#[command(name = "spawner-headless")]
struct Cli {
    /// Settings file (.ron, .toml or .json).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Scenario files or directories. Defaults to the bundled scenarios.
    paths: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => match load_settings(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => HostSettings::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let paths = if cli.paths.is_empty() {
        vec![PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios"))]
    } else {
        cli.paths
    };

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            match scenario_files(&path) {
                Ok(found) => files.extend(found),
                Err(e) => {
                    tracing::error!(dir = %path.display(), "{e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            files.push(path);
        }
    }

    let mut failed = 0;
    for file in &files {
        let result = load_scenario(file).and_then(|s| run_scenario(&s, &settings));
        match result {
            Ok(report) => {
                println!(
                    "--- {} ({} ticks) ---\n    emitted={} destroyed={} vetoed={} rejected={} live={}",
                    report.title,
                    report.ticks,
                    report.emitted,
                    report.destroyed,
                    report.vetoed,
                    report.rejected,
                    report.generators
                );
                if report.passed() {
                    println!("    PASS");
                } else {
                    failed += 1;
                    for failure in &report.failures {
                        println!("    FAIL: {failure}");
                    }
                }
            }
            Err(e) => {
                failed += 1;
                tracing::error!(file = %file.display(), "{e}");
            }
        }
    }

    println!("\n{} of {} scenarios passed.", files.len() - failed, files.len());
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
