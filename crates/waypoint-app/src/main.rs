//! # Waypoint
//!
//! Demo application for the Waypoint router, driven from a terminal.
//!
//! ## Usage
//!
//! ```bash
//! # Start an interactive session at /
//! waypoint
//!
//! # Run with custom config
//! waypoint --config /path/to/waypoint.toml
//!
//! # Render one location and exit
//! waypoint --render /users/2
//!
//! # Run with environment variables
//! WAYPOINT_INITIAL_PATH=/about WAYPOINT_SEARCH_DELAY_MS=500 waypoint
//! ```

mod config;
mod directory;
mod layout;
mod metrics;
mod pages;
mod routes;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use directory::{StaticUsers, TomlUsers, UserSource};
use std::path::PathBuf;
use std::sync::Arc;
use tenvis_waypoint_core::{Browser, Navigator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "waypoint")]
#[command(about = "Interactive demo of nested client-side routing", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to waypoint.toml in the usual places).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render this href once and exit instead of starting the shell.
    #[arg(long, value_name = "HREF")]
    render: Option<String>,

    /// Print the rendered view as markup (with --render).
    #[arg(long)]
    markup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they do not interleave with rendered views.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "waypoint=info,tenvis_waypoint_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = config::Config::load(cli.config.as_deref())?;

    if config.metrics.enabled {
        metrics::init_metrics();
        metrics::start_metrics_server(config.metrics.port)?;
    }

    let source: Box<dyn UserSource> = match config.directory_path() {
        Some(path) => Box::new(TomlUsers::new(path)),
        None => Box::new(StaticUsers::default()),
    };
    let directory = directory::load_directory(source.as_ref()).await?;

    let options = routes::AppOptions {
        search_update_delay: config.search_update_delay(),
    };
    let router = routes::build_router(directory, &options).context("Invalid route table")?;
    let stats = router.stats();
    tracing::info!(
        routes = stats.route_count,
        branches = stats.branch_count,
        boundaries = stats.boundary_count,
        "Router built"
    );

    let (navigator, commands) = Navigator::channel();
    let initial = cli.render.as_deref().unwrap_or(&config.initial_path);
    let browser = Browser::new(Arc::new(router), navigator, initial)
        .with_context(|| format!("Invalid initial location: {initial}"))?;

    if cli.render.is_some() {
        let view = browser.view();
        if cli.markup {
            println!("{}", view.to_markup());
        } else {
            println!("{view}");
        }
        return Ok(());
    }

    metrics::record_state(&browser.state());
    shell::run(browser, commands).await
}
