//! A CRUD API for a gym: members (`membros`), plans (`planos`) and the subscriptions
//! (`assinaturas`) binding them, backed by Postgres. A small in-memory tutorial API lives under `/tutorial`.

pub mod app;
pub mod config;
pub mod database;
mod error;
pub mod model;
pub mod web;

// re-export
pub use app::{serve, App, AppState};
pub use error::{Error, Result};

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Compact, human readable logs for local development. Defaults to `debug`, `RUST_LOG` overrides it.
pub fn init_dbg_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("academia=debug,tower_http=debug,sqlx=warn,info"));

    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

/// Production logs: `info` and up unless `RUST_LOG` says otherwise, no ANSI colors.
pub fn init_production_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::INFO.into()));

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(filter)
        .init();
}
