//! `rant` — command-line client for the rant like service.
//!
//! # Usage
//!
//! ```text
//! rant --url http://localhost:8787 like 3f0c…
//! rant --config ~/.config/rant/config.toml status 3f0c…
//! rant bookmark 3f0c…
//! rant card ./rant.json
//! ```

mod app;
mod client;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use rant_core::id::PostId;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rant", about = "Like and bookmark rants from the terminal")]
struct Args {
  /// Path to a TOML config file (url, data_dir).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the rant server (default: http://localhost:8787).
  #[arg(long, env = "RANT_URL")]
  url: Option<String>,

  /// Directory holding the local like cache, bookmarks and identity.
  #[arg(long, env = "RANT_DATA_DIR", value_name = "DIR")]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print this installation's anonymous identity.
  Whoami,
  /// Show whether you like a rant, and its like count.
  Status { rant: PostId },
  /// Like a rant.
  Like { rant: PostId },
  /// Remove your like from a rant.
  Unlike { rant: PostId },
  /// Render a rant exported as JSON, with its live like state.
  Card { file: PathBuf },
  /// Toggle a local bookmark on a rant.
  Bookmark { rant: PostId },
  /// List bookmarked rants.
  Bookmarks,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  data_dir: Option<PathBuf>,
}

fn default_data_dir() -> PathBuf {
  match std::env::var_os("HOME") {
    Some(home) => PathBuf::from(home).join(".local/share/rant"),
    None => PathBuf::from(".rant"),
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags and env override the config file, which overrides defaults.
  let url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:8787".to_string());
  let data_dir = args
    .data_dir
    .or(file_cfg.data_dir)
    .unwrap_or_else(default_data_dir);

  let app = App::open(url, &data_dir)?;

  match args.command {
    Command::Whoami => println!("{}", app.identity()),
    Command::Status { rant } => println!("{}", app.status(rant).await?),
    Command::Like { rant } => println!("{}", app.like(rant, true).await?),
    Command::Unlike { rant } => println!("{}", app.like(rant, false).await?),
    Command::Card { file } => println!("{}", app.card(&file).await?),
    Command::Bookmark { rant } => {
      if app.toggle_bookmark(&rant) {
        println!("Bookmark added: {rant}");
      } else {
        println!("Bookmark removed: {rant}");
      }
    }
    Command::Bookmarks => {
      let bookmarks = app.list_bookmarks();
      if bookmarks.is_empty() {
        println!("No bookmarks yet.");
      }
      for rant in bookmarks {
        println!("{rant}");
      }
    }
  }

  Ok(())
}
