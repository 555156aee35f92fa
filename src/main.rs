//! Divination backend: HTTP service over the reading engine.
//!
//! - Axum JSON API under /api/v1
//! - Optional external completion (DeepSeek-compatible, via environment)
//! - Local seeded generators when the completion is unavailable
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   DIVINATION_API_KEY     : enables the external completion if present
//!   DIVINATION_CONFIG_PATH : path to TOML config (completion, timeouts, storage, prompts)
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::info;

use divination_backend::{build_router, telemetry, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (config, registry, store, completion client).
  let state = Arc::new(AppState::from_env().await?);

  let app = build_router(state);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "divination", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "divination", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
