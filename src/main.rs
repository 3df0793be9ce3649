use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod aggregate;
mod classify;
mod config;
mod error;
mod extract;
mod models;
mod report;
mod score;

use config::Config;
use extract::SourceFormat;

#[derive(Parser)]
#[command(name = "grade-rollup")]
#[command(about = "Running grade summary for a course's graded assignments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Saved grades page, CSV or JSON export
    #[arg(long)]
    input: PathBuf,
    /// Input format; guessed from the file extension when omitted
    #[arg(long, value_enum)]
    format: Option<SourceFormat>,
    /// Title prefix that marks the proctored final exam
    #[arg(long)]
    proctored_prefix: Option<String>,
    /// Exact title of the placeholder entry that never counts
    #[arg(long)]
    shell_title: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the grade summary for one snapshot
    Summarize {
        #[command(flatten)]
        source: SourceArgs,
        /// List every entry with its tier
        #[arg(long)]
        entries: bool,
        /// Emit the summary and entries as JSON
        #[arg(long, conflicts_with = "entries")]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, default_value = "grade-report.md")]
        out: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("grade_rollup=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load(source: &SourceArgs, config: &mut Config) -> anyhow::Result<Vec<models::AssignmentRecord>> {
    if let Some(prefix) = &source.proctored_prefix {
        config.title_rules.proctored_final_prefix = prefix.clone();
    }
    if let Some(title) = &source.shell_title {
        config.title_rules.special_shell_title = title.clone();
    }

    extract::load_records(&source.input, source.format, &config.title_rules)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command {
        Commands::Summarize {
            source,
            entries,
            json,
        } => {
            let records = load(&source, &mut config)?;
            let rollup = aggregate::aggregate(&records, &config.thresholds);

            if json {
                let body = serde_json::to_string_pretty(&rollup)
                    .context("failed to encode summary as JSON")?;
                println!("{body}");
            } else {
                print!("{}", report::render_summary(&rollup, entries));
            }
        }
        Commands::Report { source, out } => {
            let records = load(&source, &mut config)?;
            let rollup = aggregate::aggregate(&records, &config.thresholds);
            let report = report::build_report(
                &source.input.display().to_string(),
                chrono::Local::now(),
                &rollup,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
