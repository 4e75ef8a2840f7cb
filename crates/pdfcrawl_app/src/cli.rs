//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;
use engine_logging::DEFAULT_LOG_FILE;
use log::LevelFilter;
use pdfcrawl_core::CrawlConfig;

/// Crawl one site for PDF documents and download them.
///
/// Settings come from a RON config file (`pdfcrawl.ron` when present) and
/// the flags below, which take precedence.
#[derive(Parser, Debug)]
#[command(name = "pdfcrawl")]
#[command(author, version, about)]
pub struct Args {
    /// RON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Page the crawl starts from
    #[arg(long)]
    pub seed: Option<String>,

    /// Directory downloaded documents are written to
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Directory for link tables and JSON reports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Log file, written alongside terminal output
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Stop after the link tables are written
    #[arg(long)]
    pub discover_only: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn apply_overrides(&self, config: &mut CrawlConfig) {
        if let Some(seed) = &self.seed {
            config.seed_url = seed.clone();
        }
        if let Some(destination) = &self.destination {
            config.destination_dir = destination.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
    }
}
