use anyhow::{Context, Result};
use clap::Parser;
use phonestat::analyzer::{analyze_file, FileOutcome};
use phonestat::cli::{Cli, OutputFormat};
use phonestat::config::AnalyzerConfig;
use phonestat::csv_output::write_outliers_csv;
use phonestat::report::{render_text, JsonReport};
use std::fs::{self, File};
use std::io::BufWriter;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for invalid arguments
const EXIT_USAGE: u8 = 1;
/// Exit status when no input file could be analyzed
const EXIT_ALL_FAILED: u8 = 2;

/// Initialize tracing subscriber on stderr
///
/// Warnings are shown by default; `--debug` raises the level. `RUST_LOG`
/// directives apply in both cases.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Cli) -> Result<AnalyzerConfig> {
    let base = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    let config = base.merge(args.overrides());
    config.validate().map_err(phonestat::Error::Config)?;
    Ok(config)
}

fn write_report(args: &Cli, outcomes: Vec<FileOutcome>) -> Result<()> {
    if let Some(path) = &args.outliers_csv {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_outliers_csv(BufWriter::new(file), &outcomes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let rendered = match args.format {
        OutputFormat::Text => render_text(&outcomes),
        OutputFormat::Json => {
            let mut report = JsonReport::new();
            for outcome in outcomes {
                report.add_outcome(outcome);
            }
            report.to_json()? + "\n"
        }
    };

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }
    Ok(())
}

fn main() -> Result<ExitCode> {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version also arrive here
            let _ = e.print();
            return Ok(if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            });
        }
    };

    init_tracing(args.debug);

    let config = load_config(&args)?;

    let outcomes: Vec<FileOutcome> = args
        .files
        .iter()
        .map(|path| analyze_file(path, args.sheet.as_deref(), &config))
        .collect();

    for outcome in &outcomes {
        match outcome {
            FileOutcome::Analyzed(_) => {}
            FileOutcome::MappingFailed { source, message }
            | FileOutcome::Unreadable { source, message } => {
                eprintln!("phonestat: {}: {}", source, message);
            }
        }
    }

    let all_failed = outcomes.iter().all(|o| !o.is_success());
    write_report(&args, outcomes)?;

    Ok(if all_failed {
        ExitCode::from(EXIT_ALL_FAILED)
    } else {
        ExitCode::SUCCESS
    })
}
