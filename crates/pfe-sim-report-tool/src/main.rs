//! pfe-report: inspect and combine analysis reports.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use pfe_sim_simulator::{AnalysisReport, ReportFormat, cost_summary, merge_reports};

#[derive(Parser)]
#[command(author, version, about = "Summarize and merge PFE analysis reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print `method, network, total cost` for every network of every method.
    Summarize {
        report: PathBuf,
        /// Read the report in binary form instead of text.
        #[arg(long, default_value_t = false)]
        binary: bool,
    },
    /// Merge runs over the same corpus that simulated different methods.
    Merge {
        /// Merged report, written as binary here and as text to `<out>.text`.
        out: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Read the inputs in binary form instead of text.
        #[arg(long, default_value_t = false)]
        binary: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    info!("pfe-report starting…");

    match cli.command {
        Commands::Summarize { report, binary } => {
            let report = read_report(&report, binary)?;
            print!("{}", cost_summary(&report));
        }
        Commands::Merge {
            out,
            inputs,
            binary,
        } => {
            let runs = inputs
                .iter()
                .map(|path| read_report(path, binary))
                .collect::<Result<Vec<_>>>()?;
            let merged = merge_reports(runs).context("Reports cannot be merged")?;
            info!(
                "Merged {} report(s): {} method(s), {} dropped sequence(s)",
                inputs.len(),
                merged.methods.len(),
                merged.dropped_sequence_count
            );

            merged.write(&out, ReportFormat::Binary)?;
            merged.write(&text_path(&out), ReportFormat::Text)?;
        }
    }
    Ok(())
}

fn read_report(path: &Path, binary: bool) -> Result<AnalysisReport> {
    let format = if binary {
        ReportFormat::Binary
    } else {
        ReportFormat::Text
    };
    AnalysisReport::read(path, format)
        .with_context(|| format!("Failed to read report {}", path.display()))
}

fn text_path(out: &Path) -> PathBuf {
    let mut name = out.as_os_str().to_owned();
    name.push(".text");
    PathBuf::from(name)
}
