//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request id, tracing, audit, timeout, body limit)
//! - Gate protected routes with the access guard
//! - Serve over plain TCP or rustls, with graceful shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::audit::audit_middleware;
use crate::config::{IntakeConfig, TlsConfig};
use crate::http::headers::{no_store_layer, nosniff_layer};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::intake::{create_record, health, IntakeState};
use crate::lifecycle::{AppContext, Shutdown};
use crate::net::tls::load_tls_config;
use crate::security::access::{ROLE_ADMIN, ROLE_CASE_WORKER};
use crate::security::{access_guard, AccessGuard, RoleRequirement};

/// How long in-flight TLS connections get to finish after shutdown.
const TLS_DRAIN_SECS: u64 = 10;

/// HTTP server for the intake API.
pub struct IntakeServer {
    router: Router,
    config: IntakeConfig,
}

impl IntakeServer {
    pub fn new(config: IntakeConfig, ctx: &AppContext) -> Self {
        let router = build_router(&config, ctx);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(Shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on the configured bind address.
    pub async fn run_tls(
        self,
        tls: &TlsConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.listener.bind_address.parse().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
        })?;
        let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path)).await?;

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            Shutdown::wait(shutdown).await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }
}

/// Build the Axum router with all middleware layers.
///
/// Layer order, outermost first: request id, trace span, request id on the
/// response, security headers, audit, timeout, body limit. Audit sits outside
/// the timeout so timed-out requests are still recorded.
#[allow(deprecated)]
pub fn build_router(config: &IntakeConfig, ctx: &AppContext) -> Router {
    let guard = AccessGuard::new(
        ctx.resolver.clone(),
        RoleRequirement::any_of([ROLE_ADMIN, ROLE_CASE_WORKER]),
    );
    let intake = IntakeState {
        cipher: ctx.cipher.clone(),
        store: ctx.store.clone(),
    };

    let protected = Router::new()
        .route("/clients", post(create_record))
        .route_layer(middleware::from_fn_with_state(guard, access_guard))
        .with_state(intake);

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(middleware::from_fn_with_state(
            ctx.recorder.clone(),
            audit_middleware,
        ))
        .layer(no_store_layer())
        .layer(nosniff_layer())
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id(request.headers()).unwrap_or("-"),
            )
        }))
        .layer(set_request_id_layer())
}
