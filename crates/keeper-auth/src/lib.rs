//! # keeper-auth
//!
//! The credential-issuance companion (spec §4.1): register and login over
//! HTTP, TLS-terminated by the binary crate. Mints the bearer tokens the
//! sync server validates on every upgrade and every `new` frame.

pub mod auth;
pub mod routes;

use axum::Router;
use keeper_db::Database;
use std::sync::Arc;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Build the complete auth service router.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::auth::router())
        .merge(routes::health::router());

    Router::new()
        .merge(api_routes)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}
