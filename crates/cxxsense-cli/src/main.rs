//! cxxsense CLI
//!
//! Ingests C/C++ analyzer reports and prints one deduplicated list of
//! violations:
//! - Clang Static Analyzer `.plist` reports
//! - generic `<error file line id msg>` XML reports
//! - Valgrind memcheck XML reports

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use cxxsense_core::{CollectingRecorder, DedupPolicy, DedupSink, PathResolver, ViolationNormalizer};
use cxxsense_sensors::{
    process_report, run_analysis, AnalysisOptions, ReportFormat, ReportJob, SensorConfig,
    DEFAULT_CONFIG_FILE,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::Level;

mod output;

use output::OutputFormat;

#[derive(Parser)]
#[command(name = "cxxsense")]
#[command(
    author,
    version,
    about = "cxxsense: normalize and deduplicate C/C++ analyzer reports"
)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest every configured report and print the unique violations.
    Analyze(AnalyzeArgs),

    /// Parse and normalize a single report without deduplication.
    ///
    /// Useful to check that a report converted by an external stylesheet
    /// has the expected shape.
    Check {
        /// Report format: clangsa | other | valgrind
        format: ReportFormat,
        /// Report file
        report: PathBuf,
        /// Base directory for relative source paths
        #[arg(long, default_value = ".")]
        base_dir: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        output: OutputFormat,
    },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Configuration file (default: ./cxxsense.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base directory of the analyzed project (overrides the config file).
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Clang Static Analyzer report path or glob (repeatable).
    #[arg(long = "clangsa")]
    clangsa: Vec<String>,

    /// "other" XML report path or glob (repeatable).
    #[arg(long = "other")]
    other: Vec<String>,

    /// Valgrind memcheck report path or glob (repeatable).
    #[arg(long = "valgrind")]
    valgrind: Vec<String>,

    /// Fail on the first malformed report instead of skipping it.
    #[arg(long)]
    no_recovery: bool,

    /// Dedup key granularity.
    #[arg(long, value_enum)]
    dedup: Option<DedupArg>,

    /// Worker threads.
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum DedupArg {
    FileLineRule,
    FileLineRuleMessage,
}

impl From<DedupArg> for DedupPolicy {
    fn from(value: DedupArg) -> Self {
        match value {
            DedupArg::FileLineRule => DedupPolicy::FileLineRule,
            DedupArg::FileLineRuleMessage => DedupPolicy::FileLineRuleMessage,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Analyze(args) => cmd_analyze(args),
        Commands::Check {
            format,
            report,
            base_dir,
            output,
        } => cmd_check(format, &report, &base_dir, output),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file (explicit, or the default one when it exists) and
/// apply command-line overrides.
fn effective_config(args: &AnalyzeArgs) -> Result<SensorConfig> {
    let mut config = match &args.config {
        Some(path) => SensorConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            SensorConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => SensorConfig::default(),
    };

    if let Some(base_dir) = &args.base_dir {
        config.base_dir = base_dir.clone();
    }
    for (format, patterns) in [
        (ReportFormat::ClangSa, &args.clangsa),
        (ReportFormat::Other, &args.other),
        (ReportFormat::Valgrind, &args.valgrind),
    ] {
        if !patterns.is_empty() {
            *config.reports.patterns_mut(format) = patterns.clone();
        }
    }
    if args.no_recovery {
        config.error_recovery = false;
    }
    if let Some(dedup) = args.dedup {
        config.dedup = dedup.into();
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    Ok(config)
}

fn cmd_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = effective_config(&args)?;
    if config.reports.is_empty() {
        tracing::warn!("no report paths configured");
    }

    let resolver = PathResolver::new(&config.base_dir)
        .with_context(|| format!("invalid base directory {}", config.base_dir.display()))?;
    let jobs = config.jobs(resolver.base_dir());

    let sink = DedupSink::with_policy(CollectingRecorder::new(), config.dedup);
    let options = AnalysisOptions {
        error_recovery: config.error_recovery,
        threads: config.threads,
    };
    let summary = run_analysis(&jobs, &resolver, &sink, &options)?;
    let violations = sink.into_recorder().into_violations();

    if args.out.is_some() {
        colored::control::set_override(false);
    }
    let mut writer = open_output(args.out.as_deref())?;
    output::write_analysis(&mut writer, args.format, &violations, &summary)?;
    writer.flush()?;
    Ok(())
}

fn cmd_check(
    format: ReportFormat,
    report: &Path,
    base_dir: &Path,
    output_format: OutputFormat,
) -> Result<()> {
    let resolver = PathResolver::new(base_dir)
        .with_context(|| format!("invalid base directory {}", base_dir.display()))?;
    let normalizer = ViolationNormalizer::new(&resolver);
    let outcome = process_report(&ReportJob::new(format, report), &normalizer)?;

    let mut stdout = io::stdout().lock();
    output::write_violations(&mut stdout, output_format, &outcome.violations)?;
    if outcome.unresolved + outcome.unlocatable > 0 {
        tracing::warn!(
            unresolved = outcome.unresolved,
            unlocatable = outcome.unlocatable,
            "some records could not be attributed to a project file"
        );
    }
    Ok(())
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(io::BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
