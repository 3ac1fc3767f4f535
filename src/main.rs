//! Catalog Guardian CLI - Command-line interface for violation catalog audits
//!
//! CDD Principle: Application Layer - CLI coordinates user interactions with domain services
//! - Translates user commands to domain operations
//! - Handles external concerns like file I/O, process exit codes, and terminal output
//! - Provides clean separation between user interface and business logic

use anyhow::Context;
use catalog_guardian::{
    AuditOptions, CatalogAuditor, CatalogSource, CheckName, ManifestSource,
    ModuleRegistry, OutputFormat, ReportFormatter, ReportOptions, SealingSupport,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;

/// Exit code for a catalog that could not be audited at all
const EXIT_FATAL: i32 = 2;

/// Catalog Guardian - Consistency audits for violation catalogs
#[derive(Parser)]
#[command(name = "catalog-guardian")]
#[command(version = "0.1.0")]
#[command(about = "Consistency auditing for violation catalogs of static-analysis tools")]
#[command(
    long_about = "Catalog Guardian checks that violation codes and messages are unique, that codes are partitioned into per-module blocks without accidental holes, and that every definition is sealed. Designed for CI integration."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a catalog manifest
    Check {
        /// Catalog manifest (YAML, or JSON with a .json extension)
        manifest: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,

        /// Treat sealing as unsupported and skip the finality check
        #[arg(long)]
        skip_sealing: bool,

        /// Run checks sequentially
        #[arg(long)]
        no_parallel: bool,

        /// Maximum number of findings to report
        #[arg(long)]
        max_findings: Option<usize>,
    },

    /// List module blocks and their occupancy
    Modules {
        /// Catalog manifest
        manifest: PathBuf,
    },

    /// Explain what a specific check enforces
    Explain {
        /// Check name, e.g. contiguity
        check: String,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Junit,
    Github,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Junit => OutputFormat::Junit,
            OutputFormatArg::Github => OutputFormat::GitHub,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match run_command(cli) {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(EXIT_FATAL);
        }
    }
}

fn run_command(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::Check {
            manifest,
            format,
            skip_sealing,
            no_parallel,
            max_findings,
        } => run_check(
            manifest,
            format,
            skip_sealing,
            no_parallel,
            max_findings,
            !cli.no_color,
        ),
        Commands::Modules { manifest } => run_modules(manifest),
        Commands::Explain { check } => Ok(run_explain(&check)),
    }
}

fn run_check(
    manifest: PathBuf,
    format: OutputFormatArg,
    skip_sealing: bool,
    no_parallel: bool,
    max_findings: Option<usize>,
    use_colors: bool,
) -> anyhow::Result<i32> {
    let mut options = AuditOptions::builder();
    if skip_sealing {
        options = options.sealing(SealingSupport::Unsupported);
    }
    if no_parallel {
        options = options.sequential();
    }
    let auditor = CatalogAuditor::with_options(options.build());

    let report = match auditor.audit_source(&ManifestSource::new(&manifest)) {
        Ok(report) => report,
        Err(e) if e.is_schema() => {
            eprintln!("❌ {}: {}", manifest.display(), e);
            return Ok(EXIT_FATAL);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to audit {}", manifest.display()))
        }
    };

    let formatter = ReportFormatter::new(ReportOptions {
        use_colors,
        max_findings,
    });
    formatter.write_report(&report, format.into(), std::io::stdout().lock())?;

    Ok(if report.is_valid() { 0 } else { 1 })
}

fn run_modules(manifest: PathBuf) -> anyhow::Result<i32> {
    let source = ManifestSource::new(&manifest);
    let catalog = source
        .load()
        .with_context(|| format!("Failed to load {}", source.describe()))?;

    let registry = match ModuleRegistry::build(&catalog) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("❌ {}: {}", manifest.display(), e);
            return Ok(EXIT_FATAL);
        }
    };

    println!("📋 Module Blocks\n");
    for stats in registry.stats() {
        let next_free = stats
            .next_free
            .map(|code| code.to_string())
            .unwrap_or_else(|| "full".to_string());
        println!(
            "  {} {:<16} {:>3}-{:<3}  {:>3} definitions  next free: {}",
            stats.index, stats.name, stats.base, stats.last, stats.definitions, next_free
        );
    }

    Ok(0)
}

fn run_explain(check: &str) -> i32 {
    match CheckName::parse(check) {
        Some(check) => {
            println!("📖 Check: {check}");
            println!();
            println!("📝 Invariant:");
            println!("   {}", check.description());
            0
        }
        None => {
            eprintln!("❌ Check '{check}' not found");
            println!();
            println!("Available checks:");
            for check in CheckName::ALL {
                println!("  - {check}");
            }
            1
        }
    }
}

fn init_logging(verbose: bool, json: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
