use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use bpy331_aggregator::aggregator::MergeAnnotation;
use bpy331_aggregator::error::AggregateError;
use bpy331_aggregator::input::{DirectoryScanner, InputSelector, ProcessedLog, SingleFile};
use bpy331_aggregator::notify::LogNotifier;
use bpy331_aggregator::pipeline::Pipeline;
use bpy331_aggregator::registry::{IdentityRegistry, InMemoryRegistry, SqliteRegistry};
use bpy331_aggregator::resolver::{ChecksumResolver, IdentityResolver, LookupResolver};
use clap::{ArgGroup, Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Look payees up in an identity registry
    Lookup,
    /// Derive payee identity from sort code and account number
    Checksum,
}

/// Aggregate BPY331 payment files to one record per payee
#[derive(Parser, Debug)]
#[command(version, group(ArgGroup::new("input").required(true).args(["file", "dir"])))]
struct Args {
    /// Payment file to aggregate in place
    #[arg(long)]
    file: Option<PathBuf>,

    /// Directory to scan for unprocessed bpy331_*.dat files
    #[arg(long)]
    dir: Option<PathBuf>,

    /// How payee identities are resolved
    #[arg(long, value_enum, default_value_t = Strategy::Lookup, env = "BPY331_STRATEGY")]
    strategy: Strategy,

    /// SQLite identity registry (lookup strategy); in-memory when omitted
    #[arg(long, env = "BPY331_REGISTRY")]
    registry: Option<PathBuf>,

    /// Log of already processed file names
    #[arg(long)]
    processed_log: Option<PathBuf>,

    /// Ignore files last modified longer ago than this (directory mode)
    #[arg(long)]
    max_age_minutes: Option<u64>,

    /// Mark merged records with the aggregate label and today's posting date
    #[arg(long)]
    annotate: bool,

    /// Write computed account references into the account_ref field
    #[arg(long)]
    stamp_account_ref: bool,

    /// Write a CSV report of the aggregated payees
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let resolver: Box<dyn IdentityResolver> = match args.strategy {
        Strategy::Checksum => Box::new(ChecksumResolver::new()),
        Strategy::Lookup => {
            let registry: Box<dyn IdentityRegistry> = match &args.registry {
                Some(path) => Box::new(SqliteRegistry::open(path).with_context(|| {
                    format!("Failed to open identity registry '{}'", path.display())
                })?),
                None => Box::new(InMemoryRegistry::new()),
            };
            Box::new(LookupResolver::new(registry))
        }
    };

    let processed_log = args.processed_log.clone().map(ProcessedLog::new);

    let selector: Box<dyn InputSelector> = if let Some(file) = &args.file {
        Box::new(SingleFile(file.clone()))
    } else if let Some(dir) = &args.dir {
        let mut scanner = DirectoryScanner::new(dir);
        if let Some(log) = &processed_log {
            scanner = scanner.with_processed_log(log.clone());
        }
        if let Some(minutes) = args.max_age_minutes {
            scanner = scanner.with_max_age(Duration::from_secs(minutes.saturating_mul(60)));
        }
        Box::new(scanner)
    } else {
        anyhow::bail!("Either --file or --dir is required");
    };

    let mut pipeline = Pipeline::new(resolver, LogNotifier);
    if args.annotate {
        pipeline = pipeline.with_annotation(MergeAnnotation::today());
    }
    if args.stamp_account_ref {
        pipeline = pipeline.with_account_ref_stamping();
    }
    if let Some(report) = &args.report {
        pipeline = pipeline.with_report(report);
    }
    if let Some(log) = processed_log {
        pipeline = pipeline.with_processed_log(log);
    }

    match pipeline.run(selector.as_ref()) {
        Ok(summaries) => {
            info!(files = summaries.len(), "run complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(AggregateError::NoInputFound { location }) => {
            info!(location = %location.display(), "no payment file to aggregate");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Err(e).context("Failed to aggregate payment files"),
    }
}
