mod tui;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use fuzztrie::node::mask_letters;
use fuzztrie::{Dictionary, LoadOptions};
use regex::Regex;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Prefix and fuzzy lookups over a word list
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Word list to load, one word per line
    #[arg(short, long, default_value = "/usr/share/dict/words")]
    words: PathBuf,

    /// Only load words matching this regular expression
    #[arg(short, long)]
    filter: Option<String>,

    /// Skip words with characters outside a-z instead of failing
    #[arg(long)]
    lenient: bool,

    /// Lowercase words before loading
    #[arg(long)]
    fold_case: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// List every word
    Keys,
    /// List words starting with prefix
    Prefix { prefix: String },
    /// List words containing pattern as a subsequence
    Fuzzy { pattern: String },
    /// Show dictionary statistics
    Stats,
}

impl Cli {
    fn load_options(&self) -> Result<LoadOptions> {
        let filter = self
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("invalid --filter expression")?;

        Ok(LoadOptions {
            filter,
            lenient: self.lenient,
            fold_case: self.fold_case,
        })
    }

    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match (&cli.log_file, &cli.command) {
        (Some(path), _) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // The TUI owns the terminal; without a log file it logs nowhere.
        (None, None) => {}
        (None, Some(_)) => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let options = cli.load_options()?;
    let (dictionary, report) = Dictionary::load(&cli.words, &options)?;
    info!(words = report.inserted, path = %cli.words.display(), "dictionary ready");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        match cli.command {
            Some(Commands::Keys) => {
                for word in dictionary.words().await {
                    println!("{word}");
                }
            }
            Some(Commands::Prefix { prefix }) => {
                for word in dictionary.words_starting_with(&prefix).await? {
                    println!("{word}");
                }
            }
            Some(Commands::Fuzzy { pattern }) => {
                for word in dictionary.fuzzy_matches(&pattern).await?.iter() {
                    println!("{word}");
                }
            }
            Some(Commands::Stats) => {
                let (nodes, mask) = dictionary.shape().await;
                println!("words:    {}", dictionary.len().await);
                println!("nodes:    {nodes}");
                println!("letters:  {}", mask_letters(mask));
                println!("lines:    {}", report.lines);
                println!(
                    "skipped:  {} filtered, {} rejected, {} duplicates",
                    report.filtered, report.rejected, report.duplicates
                );
            }
            None => tui::run_tui(dictionary).await?,
        }
        Ok::<_, anyhow::Error>(())
    })
}
