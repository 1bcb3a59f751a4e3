//! MediTrack Development Remote Store
//!
//! A small stand-in for the hosted table service, so the CLI's remote mode
//! can be exercised locally.
//!
//! # Configuration
//!
//! Environment variables:
//! - `MEDITRACK_SERVER_PORT`: Port to listen on (default: 54321)
//! - `MEDITRACK_SERVER_DB`: SQLite database path (default: ~/.local/share/meditrack-server/remote.db)
//! - `MEDITRACK_SERVER_KEY`: Key clients must send as `apikey` or `Bearer` token
//!
//! Point the CLI at it with:
//!
//! ```yaml
//! remote:
//!   url: http://localhost:54321
//!   api_key: "<MEDITRACK_SERVER_KEY>"
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use meditrack::server::{router, AppState, RecordStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Server configuration
#[derive(Debug, Clone)]
struct Config {
    /// Port to listen on
    port: u16,
    /// SQLite database file
    db_path: PathBuf,
    /// Accepted client key
    api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        let port = std::env::var("MEDITRACK_SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(54321);

        let db_path = std::env::var("MEDITRACK_SERVER_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::data_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("meditrack-server")
                    .join("remote.db")
            });

        let api_key = std::env::var("MEDITRACK_SERVER_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        Self {
            port,
            db_path,
            api_key,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meditrack_server=info,meditrack=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    tracing::info!("Database: {}", config.db_path.display());
    if config.api_key.is_none() {
        tracing::warn!("MEDITRACK_SERVER_KEY is not set - all table requests will be rejected");
    }

    let store = match RecordStore::open(&config.db_path).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let app = router(AppState::new(store, config.api_key));

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

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
