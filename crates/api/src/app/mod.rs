//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage, tenant directory and audit sink wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs, query strings and list envelopes
//! - `extract.rs`: `ApiJson`/`ApiQuery`, rejecting malformed input as 400
//! - `errors.rs`: the `{error, message, code}` error response

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use learnhub_auth::Hs256SessionValidator;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(&config).await?);
    let auth_state = middleware::AuthState {
        sessions: Arc::new(Hs256SessionValidator::new(config.session_secret.as_bytes())),
        services: services.clone(),
        tenant_header: config.tenant_header.clone(),
    };

    // Everything under /api needs a tenant and a session.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::tenant_session_middleware,
        ));

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", protected))
}
