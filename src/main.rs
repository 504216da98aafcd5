//! restmux server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (axum, tower-http layers)
//!                          │
//!                          ▼
//!                     routing::Router ──(no match)──▶ 404
//!                          │
//!                          ▼
//!                     pipeline::Engine
//!                       Negotiate → Authenticate → DecodeInput
//!                       → Dispatch → PrepareOutput → EncodeOutput
//!                          │            ▲
//!                          ▼            │
//!                     resource::Resource handlers
//!                          │
//!     Client Response      ▼
//!     ◀────────────── WriteResponse (+ access log, metrics)
//! ```
//!
//! Mounts a demo in-memory collection at `/items` and a Basic-protected
//! `/whoami`. Credentials come from `RESTMUX_DEMO_USER` and
//! `RESTMUX_DEMO_PASSWORD`; when unset every login is refused.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use serde_json::json;

use restmux::auth::{HttpBasic, SyncCheck};
use restmux::config::{load_config, ApiConfig};
use restmux::http::{HandlerError, HttpServer};
use restmux::lifecycle::{self, Shutdown};
use restmux::observability;
use restmux::resource::{Call, MemoryCollection, Resource};
use restmux::routing::{RouteError, Router};

const ITEMS_PATTERN: &str = r"/items(/)?(?P<key>\w{1,32})?(?P<format>\.\w{1,8})?$";
const WHOAMI_PATTERN: &str = r"/whoami(?P<format>\.\w{1,8})?$";

#[derive(Parser)]
#[command(name = "restmux")]
#[command(about = "Multi-format REST resource server", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

fn demo_routes(config: &ApiConfig) -> Result<Router, RouteError> {
    let user = std::env::var("RESTMUX_DEMO_USER").ok();
    let password = std::env::var("RESTMUX_DEMO_PASSWORD").ok();
    let check = SyncCheck(move |u: &str, p: &str| {
        matches!((&user, &password), (Some(user), Some(password)) if user == u && password == p)
    });

    let whoami = Resource::new("whoami")
        .allow_anonymous(false)
        .authenticate_with(HttpBasic::new(config.auth.realm.clone(), check))
        .get(|call: Call| async move {
            let name = call.head.principal.as_ref().map(|p| p.name.clone());
            Ok::<_, HandlerError>(json!({ "user": name }))
        });

    Router::new()
        .route(ITEMS_PATTERN, MemoryCollection::new().resource("items"))?
        .route(WHOAMI_PATTERN, whoami)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ApiConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    observability::init_logging(&config.observability.log_level);
    tracing::info!("restmux v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_format = %config.negotiation.default_format,
        strict = config.negotiation.strict,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = observability::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let engine = Arc::new(lifecycle::build_engine(&config)?);
    let routes = Arc::new(demo_routes(&config)?);
    tracing::info!(routes = routes.len(), "Routes mounted");

    let listener = lifecycle::bind_listener(&config).await?;
    let server = HttpServer::new(config, engine, routes);

    let shutdown = Arc::new(Shutdown::new());
    let receiver = shutdown.subscribe();
    let signals = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { lifecycle::wait_for_signal(&shutdown).await })
    };

    server.run(listener, receiver).await?;
    signals.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
