//! `tally`: household budget ledger on the command line.
//!
//! Reads `tally.toml` (or the path given with `--config`), layers `TALLY_*`
//! environment variables on top, opens the configured store, and makes sure
//! the ledger document is provisioned before running the subcommand.
//!
//! ```
//! tally budget set --week1 300 --misc 250
//! tally spend week1 16.50 groceries
//! tally summary
//! ```

mod commands;
mod render;
mod settings;

use std::{
  io::{self, BufRead, Write},
  path::PathBuf,
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use commands::Command;
use settings::{AppConfig, Backend, expand_tilde};
use tally_core::{Session, options::LedgerOptions, reset::RESET_PHRASE, store::TabularStore};
use tally_store_sheets::SheetsStore;
use tally_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally", version, about = "Household budget ledger")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tally.toml", env = "TALLY_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  let command = match cli.command {
    Command::Reset { confirm: None, only } => Command::Reset {
      confirm: Some(prompt_confirmation()?),
      only,
    },
    other => other,
  };

  match cfg.backend {
    Backend::Sqlite => {
      let path = expand_tilde(&cfg.sqlite_path);
      if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
      {
        std::fs::create_dir_all(dir)
          .with_context(|| format!("failed to create {}", dir.display()))?;
      }
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      execute(store, cfg.ledger, command).await
    }
    Backend::Sheets => {
      let store = SheetsStore::new(cfg.sheets()?).context("failed to build sheets client")?;
      execute(store, cfg.ledger, command).await
    }
  }
}

async fn execute<S: TabularStore>(
  store: S,
  options: LedgerOptions,
  command: Command,
) -> anyhow::Result<()> {
  let session = Session::open(Arc::new(store), options)
    .await
    .context("failed to open ledger")?;
  let mut stdout = io::stdout().lock();
  commands::run(&session, command, &mut stdout).await
}

/// Ask for the reset phrase on stdin.
fn prompt_confirmation() -> anyhow::Result<String> {
  print!("This erases every expense and zeroes the budget. Type {RESET_PHRASE:?} to continue: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}
