//! Materia Server
//!
//! Axum server for the material library: renders the catalog page, exposes
//! the view operations and the host bridge over HTTP, and streams view
//! events. The `render` subcommand prints a one-shot rendering instead.

mod api;
mod assets;
mod host;

use anyhow::Context;
use axum::{routing::get, Router};
use clap::{Parser, Subcommand};
use materia_core::config::DEFAULT_CONFIG_PATH;
use materia_core::view::{CategoryFilter, LoadOutcome};
use materia_core::{CatalogLoader, LibraryConfig, MaterialHost, MaterialLibrary};
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio::net::TcpListener;

use crate::host::WebhookHost;

/// Application state
pub struct AppState {
    pub library: Arc<MaterialLibrary>,
    /// Page heading
    pub title: String,
}

pub type SharedState = Arc<AppState>;

/// How often the debounce and notification clock advances.
const TICK_PERIOD: Duration = Duration::from_millis(50);

/// Upper bound on a remote catalog fetch.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Clone)]
#[command(author, version, about = "Materia - Material catalog library")]
struct Args {
    /// Config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Serve the library over HTTP (default)
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
        /// Catalog path or URL
        #[arg(short, long)]
        source: Option<String>,
        /// URL that receives apply payloads
        #[arg(long)]
        webhook: Option<String>,
    },
    /// Load the catalog once and print the rendered view
    Render {
        /// Catalog path or URL
        #[arg(short, long)]
        source: Option<String>,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Category tag to filter by
        #[arg(short, long)]
        filter: Option<String>,
        /// Search query
        #[arg(long)]
        search: Option<String>,
        /// Plain-text listing instead of HTML
        #[arg(long)]
        text: bool,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("materia_core=info,materia_server=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_library(config: &LibraryConfig) -> anyhow::Result<Arc<MaterialLibrary>> {
    let source = config.source();
    if !source.exists() {
        tracing::warn!(source = %source, "Catalog source does not exist yet");
    }

    let host = config.host_webhook.as_ref().map(|url| {
        tracing::info!(url = %url, "Apply actions go to host webhook");
        Arc::new(WebhookHost::new(url.clone())) as Arc<dyn MaterialHost>
    });
    if host.is_none() {
        tracing::info!("No host configured, apply actions are simulated");
    }

    let loader = CatalogLoader::with_timeout(FETCH_TIMEOUT)
        .context("Failed to build catalog HTTP client")?;
    Ok(Arc::new(MaterialLibrary::new(Arc::new(loader), source, host)))
}

/// Full router: page, `/api/v1`, and embedded assets.
pub fn app(state: SharedState) -> Router {
    Router::new()
        .route("/", get(api::view::index))
        .nest("/api/v1", api::api_routes())
        .route("/assets/*path", get(assets::serve_static))
        .with_state(state)
}

// === Server Entry ===

pub async fn run_server(config: LibraryConfig) -> anyhow::Result<()> {
    let library = build_library(&config)?;
    library.spawn_ticker(TICK_PERIOD);
    library.spawn_refresh();

    let state: SharedState = Arc::new(AppState {
        library,
        title: config.title().to_string(),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port()));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, source = %config.source(), "Materia server running");

    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn run_render(
    config: LibraryConfig,
    output: Option<PathBuf>,
    filter: Option<String>,
    search: Option<String>,
    text: bool,
) -> anyhow::Result<()> {
    let library = build_library(&config)?;
    if library.load().await == LoadOutcome::Failed {
        tracing::warn!(source = %config.source(), "Catalog could not be loaded");
    }
    if let Some(filter) = filter {
        library.set_filter(CategoryFilter::parse(&filter)).await;
    }
    if let Some(search) = search {
        library.set_search(search).await;
    }

    let rendered = if text {
        library.render_text().await
    } else {
        library.render_page(config.title()).await
    };

    match output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write output: {:?}", path))?;
            tracing::info!(path = %path.display(), "Rendered view written");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = LibraryConfig::load(&args.config).await?;

    match args.command {
        Some(CliCommand::Serve {
            port,
            source,
            webhook,
        }) => {
            config.merge(LibraryConfig {
                catalog_source: source,
                host_webhook: webhook,
                port,
                ..Default::default()
            });
            run_server(config).await
        }
        Some(CliCommand::Render {
            source,
            output,
            filter,
            search,
            text,
        }) => {
            config.merge(LibraryConfig {
                catalog_source: source,
                ..Default::default()
            });
            run_render(config, output, filter, search, text).await
        }
        None => run_server(config).await,
    }
}
