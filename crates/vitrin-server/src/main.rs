//! vitrin-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the storefront API over HTTP.
//!
//! # Seeding a demo catalog
//!
//! ```
//! cargo run -p vitrin-server -- --seed
//! ```
//!
//! # Password hash generation
//!
//! To generate an argon2 PHC string (e.g. for manual user rows):
//!
//! ```
//! cargo run -p vitrin-server -- --hash-password
//! ```

mod seed;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Router,
  http::{HeaderValue, Method, header},
};
use clap::Parser;
use rand_core::OsRng;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vitrin_api::{ApiConfig, AppState};
use vitrin_store_sqlite::SqliteStore;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Server settings, from `config.toml` and `VITRIN_*` environment
/// variables (environment wins).
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// Exact origin allowed to call the API from a browser. Unset means no
  /// cross-origin access.
  #[serde(default)]
  pub cors_origin:      Option<String>,
  #[serde(default = "default_environment")]
  pub environment:      String,
  #[serde(default = "default_session_ttl_days")]
  pub session_ttl_days: i64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 4000 }
fn default_store_path() -> PathBuf { PathBuf::from("vitrin.db") }
fn default_environment() -> String { "development".to_owned() }
fn default_session_ttl_days() -> i64 { 7 }

// ─── CLI ─────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Vitrin storefront API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Populate the store with a demo catalog before serving.
  #[arg(long)]
  seed: bool,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: hash a password and exit.
  if cli.hash_password {
    let password = read_password_line()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("VITRIN"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  if cli.seed {
    seed::seed_demo_catalog(&store)
      .await
      .context("failed to seed demo catalog")?;
    tracing::info!("Demo catalog seeded");
  }

  let state = AppState {
    store:  Arc::new(store),
    config: Arc::new(ApiConfig {
      session_ttl_days: server_cfg.session_ttl_days,
      environment:      server_cfg.environment.clone(),
    }),
  };

  let app = Router::new()
    .nest("/api", vitrin_api::api_router(state))
    .layer(cors_layer(server_cfg.cors_origin.as_deref())?)
    .layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Build the CORS layer for the configured origin, if any.
fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
  let mut layer = CorsLayer::new()
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PUT,
      Method::PATCH,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    .max_age(Duration::from_secs(60 * 60));

  if let Some(origin) = origin {
    let value: HeaderValue = origin
      .parse()
      .with_context(|| format!("invalid cors_origin {origin:?}"))?;
    layer = layer.allow_origin(value);
  }

  Ok(layer)
}

/// Read a password from stdin.
fn read_password_line() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
