mod console;
mod input;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bingo_dedupe_core::{
    AppConfig, Author, Book, DedupeError, ExitCode, FuzzyOracle, Recorded, Session,
    SessionReport,
};

use crate::console::ConsoleAdjudicator;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bingo-dedupe",
    about = "Interactive deduplication of reading-bingo authors and books",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the duplicate records.
    /// Also settable with BINGO_DEDUPE_DATA_DIR.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Minimum similarity (0-100) for a candidate to be offered.
    #[arg(long, global = true, value_parser = clap::value_parser!(u8).range(0..=100))]
    match_score: Option<u8>,

    /// Re-examine entities already recorded as canonical keys.
    #[arg(long, global = true)]
    rescan_keys: bool,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate author names.
    Authors {
        /// Text file with one author per line.
        pool: PathBuf,
        /// Skip the second pass over individual names from multi-author groups.
        #[arg(long)]
        skip_single_authors: bool,
    },

    /// Deduplicate books.
    Books {
        /// Text file with one `title<TAB>author` pair per line.
        pool: PathBuf,
        /// Record books by misspelled authors as duplicates first.
        #[arg(long)]
        propagate_authors: bool,
    },

    /// Repair overlapping duplicates without scanning anything new.
    Reconcile,

    /// Print the variant → canonical map as JSON.
    Map {
        #[arg(value_enum)]
        kind: Kind,
    },

    /// Show the canonical form of one author or book.
    Lookup {
        #[arg(value_enum)]
        kind: Kind,
        entity: String,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Author,
    Book,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file location.
    Path,
    /// Show the effective config.
    Show,
    /// Write the default config if none exists.
    Init,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => match err.downcast_ref::<DedupeError>() {
            Some(core_err) if core_err.is_user_termination() => {
                info!("Saving progress and exiting");
                ExitCode::Interrupted
            }
            Some(core_err) => {
                error!("{err:#}");
                ExitCode::from(core_err)
            }
            None => {
                error!("{err:#}");
                ExitCode::GeneralError
            }
        },
    };
    process::ExitCode::from(code as u8)
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "bingo_dedupe=debug"
    } else {
        "bingo_dedupe=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Authors {
            pool,
            skip_single_authors,
        } => {
            let pool = input::read_authors(&pool)
                .with_context(|| format!("reading author pool {}", pool.display()))?;
            let mut settings = config.authors.clone();
            if skip_single_authors {
                settings.single_author_pass = false;
            }

            info!(
                "Starting with {} unique authors. Enter `e` at any prompt to save and exit.",
                pool.len()
            );
            let mut adjudicator = console_adjudicator(io::stdout());
            let mut session = Session::from_config(&config, &mut adjudicator)?;
            let reports =
                session.run_authors(pool, &settings, &FuzzyOracle::new(), &mut adjudicator)?;
            Ok(summarize(&reports))
        }

        Commands::Books {
            pool,
            propagate_authors,
        } => {
            let pairs = input::read_books(&pool, &config.matching.title_author_separator)
                .with_context(|| format!("reading book pool {}", pool.display()))?;

            info!(
                "Starting with {} unique books. Enter `e` at any prompt to save and exit.",
                pairs.len()
            );
            let mut adjudicator = console_adjudicator(io::stdout());
            let mut session = Session::from_config(&config, &mut adjudicator)?;
            let report = session.run_books(
                &pairs,
                propagate_authors,
                &FuzzyOracle::new(),
                &mut adjudicator,
            )?;
            Ok(summarize(&[report]))
        }

        Commands::Reconcile => {
            let mut adjudicator = console_adjudicator(io::stdout());
            let loaded = Session::from_config(&config, &mut adjudicator)?.loaded();
            println!(
                "Reconciled {} author and {} book overlaps.",
                loaded.authors.total(),
                loaded.books.total()
            );
            Ok(ExitCode::Success)
        }

        Commands::Map { kind } => {
            // Overlap prompts go to stderr so stdout stays valid JSON.
            let mut adjudicator = console_adjudicator(io::stderr());
            let session = Session::from_config(&config, &mut adjudicator)?;
            match kind {
                Kind::Author => print_map::<Author>(&session)?,
                Kind::Book => print_map::<Book>(&session)?,
            }
            Ok(ExitCode::Success)
        }

        Commands::Lookup { kind, entity } => {
            let mut adjudicator = console_adjudicator(io::stderr());
            let session = Session::from_config(&config, &mut adjudicator)?;
            let canonical = match kind {
                Kind::Author => lookup::<Author>(&session, entity)?.to_string(),
                Kind::Book => lookup::<Book>(&session, entity)?.to_string(),
            };
            println!("{canonical}");
            Ok(ExitCode::Success)
        }

        Commands::Config { action } => {
            let path = cli.config.unwrap_or_else(AppConfig::config_path);
            match action {
                ConfigAction::Path => println!("{}", path.display()),
                ConfigAction::Show => println!("{}", serde_json::to_string_pretty(&config)?),
                ConfigAction::Init => {
                    if path.exists() {
                        println!("Config already exists: {}", path.display());
                    } else {
                        AppConfig::default().save_to(&path)?;
                        println!("Wrote default config: {}", path.display());
                    }
                }
            }
            Ok(ExitCode::Success)
        }
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Config file, then env, then flags.
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Ok(dir) = std::env::var("BINGO_DEDUPE_DATA_DIR") {
        config.set_data_dir(dir.into());
    }
    if let Some(dir) = &cli.data_dir {
        config.set_data_dir(dir.clone());
    }
    if let Some(score) = cli.match_score {
        config.matching.match_score = score;
    }
    if cli.rescan_keys {
        config.matching.rescan_keys = true;
    }
    config.validate()?;
    Ok(config)
}

fn console_adjudicator<W: Write>(output: W) -> ConsoleAdjudicator<io::StdinLock<'static>, W> {
    ConsoleAdjudicator::new(io::stdin().lock(), output)
}

fn summarize(reports: &[SessionReport]) -> ExitCode {
    for report in reports {
        println!(
            "{}: {} processed, {} recorded as duplicates, {} ignored, {} left",
            report.kind, report.processed, report.merges, report.ignores, report.remaining
        );
    }
    if reports.iter().any(SessionReport::is_terminated) {
        ExitCode::Interrupted
    } else {
        ExitCode::Success
    }
}

fn print_map<E: Recorded>(session: &Session) -> Result<()> {
    let map = session.dupes().registry::<E>().get_dedupe_map();
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn lookup<E: Recorded>(session: &Session, text: String) -> Result<E> {
    let entity = E::from(text);
    let canonical = session
        .dupes()
        .registry::<E>()
        .canonical_of(&entity)
        .cloned()
        .ok_or_else(|| DedupeError::NotFound(format!("{entity} has not been scanned")))?;
    Ok(canonical)
}
