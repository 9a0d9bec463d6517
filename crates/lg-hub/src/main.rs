use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tables::{TableConfig, TableRegistry};

mod api;
mod sources;
mod tables;

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser)]
#[command(name = "lg-hub", version, about = "Leadgrid table service")]
struct Args {
    /// Server bind address (overrides `[server] bind`)
    #[arg(long)]
    bind: Option<String>,

    /// Path to config file
    #[arg(long, default_value = "lg-hub.toml")]
    config: PathBuf,
}

// =============================================================================
// Config
// =============================================================================

#[derive(Debug, thiserror::Error)]
enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Deserialize, Default, Clone, Debug)]
struct Config {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    tables: Vec<TableConfig>,
}

#[derive(Deserialize, Clone, Debug)]
struct ServerConfig {
    #[serde(default = "default_bind")]
    bind: String,
    /// Page size when a request carries no valid `size`.
    #[serde(default = "default_page_size")]
    default_page_size: u32,
    /// Upper bound applied to every requested `size`.
    #[serde(default = "default_max_page_size")]
    max_page_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".into()
}
fn default_page_size() -> u32 {
    lg_core::params::DEFAULT_PAGE_SIZE
}
fn default_max_page_size() -> u32 {
    200
}

impl Config {
    /// A missing file means defaults; an unreadable or invalid one is an error.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

// =============================================================================
// Application State
// =============================================================================

struct AppState {
    tables: TableRegistry,
    config: Config,
    start_time: Instant,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "lg_hub=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let bind = args.bind.clone().unwrap_or_else(|| config.server.bind.clone());
    let addr: SocketAddr = match bind.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("Invalid bind address {:?}: {}", bind, e);
            std::process::exit(1);
        }
    };

    let tables = TableRegistry::from_config(&config.tables);
    for table in tables.list() {
        tracing::info!("Registered table {:?} ({} source)", table.id, table.source);
    }

    let state = Arc::new(AppState {
        tables,
        config,
        start_time: Instant::now(),
    });
    let app = api::router(state);

    tracing::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    tracing::info!("  Leadgrid v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("  Leads:   http://{}/api/leads", addr);
    tracing::info!("  Tables:  http://{}/api/tables", addr);
    tracing::info!("  Status:  http://{}/api/status", addr);
    tracing::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
