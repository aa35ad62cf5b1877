//! Phonics Practice Backend
//!
//! - Axum HTTP + WebSocket API
//! - Server-side game and assessment state machines (one per socket)
//! - Static SPA fallback (`static_dir`/index.html) for the named page routes
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   PHONICS_CONFIG_PATH : path to TOML config (static dir, content, roster, timings)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod assessment;
mod catalog;
mod config;
mod domain;
mod error;
mod game;
mod pages;
mod protocol;
mod roster;
mod routes;
mod seeds;
mod state;
mod telemetry;
mod timer;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::config::load_config_from_env;
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Config problems fall back to defaults; content problems are fatal.
  let config = load_config_from_env();
  let state = Arc::new(AppState::build(config).await?);

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "phonics_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      let _ = tokio::signal::ctrl_c().await;
      info!(target: "phonics_backend", "Shutdown signal received");
    })
    .await?;
  Ok(())
}
