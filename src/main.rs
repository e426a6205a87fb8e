//! Secure Intake API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ audit ─▶ timeout/limits ─▶ access guard ─▶ createRecord
//!                                             │                          │                 │
//!                                             │                  IdentityResolver     FieldCipher
//!                                             │                  + RoleRequirement    + RecordStore
//!                                             ▼
//!                                   redact ─▶ AuditSink
//! ```
//!
//! Configuration comes from the TOML file named by `INTAKE_CONFIG` (optional)
//! overlaid with environment variables. Startup fails if key material is
//! missing.

use std::path::PathBuf;

use tokio::net::TcpListener;

use secure_intake::config::load_with_env;
use secure_intake::observability::{logging, metrics};
use secure_intake::{AppContext, IntakeServer, Shutdown};

/// Environment variable naming the TOML config file.
const ENV_CONFIG_PATH: &str = "INTAKE_CONFIG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from);
    let config = match load_with_env(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("secure-intake: {}", e);
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.observability)?;

    tracing::info!("secure-intake v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        resolver = ?config.auth.resolver,
        tls = config.listener.tls.is_some(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let ctx = AppContext::from_config(&config)?;

    let shutdown = Shutdown::new();
    shutdown.listen_for_signals();

    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = IntakeServer::new(config, &ctx);

    match tls {
        Some(tls) => server.run_tls(&tls, shutdown.subscribe()).await?,
        None => {
            let listener = TcpListener::bind(&bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
