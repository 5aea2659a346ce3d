//! blogdev - terminal client for Blog.Dev
//!
//! Browse, search, write and discuss blog posts without leaving the
//! terminal.

mod app;
mod config;
mod error;
mod gate;
mod models;
mod routes;
mod screens;
mod services;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::routes::Route;

/// blogdev - Blog.Dev in your terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Config file path (default: ~/.config/blogdev/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Backend base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Session database path (default: ~/.local/share/blogdev/local_storage.db)
    #[arg(long)]
    storage: Option<String>,

    /// Path to open first, e.g. /myposts or /posts/42
    #[arg(long, default_value = "/")]
    route: String,
}

/// Send log lines to `<data dir>/blogdev.log`; the terminal belongs to the UI.
fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        "blogdev=debug,info"
    } else {
        "blogdev=info,warn"
    };

    let dir = Config::data_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    let log_path = dir.join("blogdev.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.debug)?;

    // Load configuration
    let mut config = if let Some(path) = args.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    // Command line overrides
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
    }
    if let Some(storage) = args.storage {
        config.storage.path = Some(storage);
    }

    let start = Route::resolve(&args.route);
    info!("blogdev starting against {}", config.api_base_url());

    let mut app = app::App::new(config, start)?;
    app.run().await
}
