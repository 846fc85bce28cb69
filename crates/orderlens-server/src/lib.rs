//! A fixture-backed implementation of the orders API.
//!
//! Serves the same three endpoints the terminal client consumes, from a JSON
//! dataset loaded at startup. Intended for local development and as the peer
//! in client tests.

pub mod auth;
pub mod dataset;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use dataset::Dataset;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ORDERLENS_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  pub api_token:    String,
  pub dataset_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8000 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState {
  pub dataset:   Arc<Dataset>,
  pub api_token: Arc<str>,
}

impl AppState {
  pub fn new(dataset: Dataset, api_token: impl Into<Arc<str>>) -> Self {
    Self { dataset: Arc::new(dataset), api_token: api_token.into() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router.
pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/top_customers", get(handlers::top_customers))
    .route("/customer/{id}", get(handlers::customer))
    .route("/customer/{id}/order_summary", get(handlers::order_summary))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
