use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use phapcu::search::SearchArgs;

mod commands;
mod data;

#[derive(Parser)]
#[command(name = "khanh")]
#[command(
  about = "Khánh - Quote of the Moment\nTimed Buddhist quote rotation and diacritic-insensitive search"
)]
#[command(version)]
struct Cli {
  /// Quotes collection to load instead of the bundled one
  #[arg(long, env = "KHANH_QUOTES", global = true, value_name = "FILE")]
  quotes: Option<std::path::PathBuf>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Search quotes by content, author, category and tags
  Search {
    #[command(flatten)]
    options: SearchArgs,
    /// Search terms (space-separated)
    #[arg(required = true)]
    terms: Vec<String>,
  },
  /// Browse the collection with optional filters
  List {
    #[command(flatten)]
    options: SearchArgs,
  },
  /// Show one random quote
  Random,
  /// Rotate quotes on a timer until interrupted
  Rotate {
    /// Seconds between transitions (clamped to 5-60)
    #[arg(short, long, default_value_t = 15)]
    interval: u64,
    /// How many recent quotes are kept out of the draw
    #[arg(long, default_value_t = 10)]
    recent: usize,
  },
  /// List every category with its quote count
  Categories,
  /// List every tag with its quote count
  Tags,
}

#[tokio::main]
async fn main() -> Result<()> {
  // keep stdout for quotes; diagnostics go to stderr
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(filter)
    .init();

  let cli = Cli::parse();
  let pool = data::load(cli.quotes.as_deref())?;

  match cli.command {
    Commands::Search { options, terms } => {
      commands::search_quotes(&pool, &options, &terms)?;
    }
    Commands::List { options } => {
      commands::list_quotes(&pool, &options)?;
    }
    Commands::Random => {
      commands::random_quote(&pool)?;
    }
    Commands::Rotate { interval, recent } => {
      commands::rotate_quotes(pool, interval, recent).await?;
    }
    Commands::Categories => {
      commands::list_categories(&pool)?;
    }
    Commands::Tags => {
      commands::list_tags(&pool)?;
    }
  }

  Ok(())
}
