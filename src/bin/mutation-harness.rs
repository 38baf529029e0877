use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mutation_harness::config::{ConfigDocument, ConfigSynthesizer, SynthesisOptions};
use mutation_harness::progress::{
    DefaultMetrics, EventDispatcher, PlainDiff, ProgressReporter, ReporterOptions, RunSession,
    read_event_feed,
};

#[derive(Debug, Parser)]
#[command(name = "mutation-harness")]
#[command(about = "Configuration synthesis and progress reporting for mutation testing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the execution-ready test configuration and print its path.
    Synthesize {
        /// Original test-framework configuration file.
        original: PathBuf,
        /// Test-framework runtime version, e.g. 7.2.13.
        #[arg(long = "runtime-version")]
        runtime_version: String,
        /// Directory receiving the synthesized file and coverage data.
        #[arg(long)]
        tmp_dir: PathBuf,
        /// Source directory for a generated coverage whitelist (repeatable).
        #[arg(long = "src-dir")]
        src_dirs: Vec<String>,
        /// Result log target. Defaults to `<tmp-dir>/junit.xml`.
        #[arg(long)]
        junit: Option<PathBuf>,
        /// Do not add coverage and result loggers.
        #[arg(long)]
        skip_coverage: bool,
    },
    /// Replay a JSON-lines event feed through the progress reporter.
    Report {
        /// Event feed; reads stdin when omitted.
        events: Option<PathBuf>,
        /// List escaped mutants with their diffs before the summary.
        #[arg(long)]
        show_mutations: bool,
    },
}

fn make_options(
    original: &Path,
    tmp_dir: PathBuf,
    src_dirs: Vec<String>,
    junit: Option<PathBuf>,
    skip_coverage: bool,
) -> Result<SynthesisOptions> {
    let original = original
        .canonicalize()
        .with_context(|| format!("cannot resolve {}", original.display()))?;
    let config_dir = original
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut options = SynthesisOptions::default()
        .with_config_dir(config_dir)
        .with_result_log_path(junit.unwrap_or_else(|| tmp_dir.join("junit.xml")))
        .with_output_dir(tmp_dir)
        .with_skip_coverage(skip_coverage);
    if !src_dirs.is_empty() {
        options = options.with_source_dirs(src_dirs);
    }
    Ok(options)
}

fn open_feed(events: Option<PathBuf>) -> Result<Box<dyn BufRead>> {
    match events {
        Some(path) => {
            let file =
                File::open(&path).with_context(|| format!("cannot open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Synthesize {
            original,
            runtime_version,
            tmp_dir,
            src_dirs,
            junit,
            skip_coverage,
        } => {
            let options = make_options(&original, tmp_dir, src_dirs, junit, skip_coverage)?;
            let document = ConfigDocument::load(&original)
                .with_context(|| format!("cannot load {}", original.display()))?;
            let path = ConfigSynthesizer::new(options).synthesize(&document, &runtime_version)?;
            println!("{}", path.display());
        }
        Command::Report {
            events,
            show_mutations,
        } => {
            let feed = read_event_feed(open_feed(events)?)?;
            if feed.malformed_lines > 0 {
                tracing::warn!(skipped = feed.malformed_lines, "event feed had malformed lines");
            }

            let mut reporter = ProgressReporter::new(
                RunSession::new(),
                io::stdout(),
                DefaultMetrics::new(),
                PlainDiff,
                ReporterOptions::default().with_show_mutations(show_mutations),
            );
            {
                let mut dispatcher = EventDispatcher::new();
                dispatcher.subscribe(&mut reporter);
                dispatcher.dispatch_all(&feed.events)?;
            }

            let session = reporter.session();
            if session.processed_count() != session.total_mutation_count() {
                bail!(
                    "event feed ended after {} of {} mutants",
                    session.processed_count(),
                    session.total_mutation_count()
                );
            }
        }
    }

    Ok(())
}
