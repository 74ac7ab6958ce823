//! Authentication Routes
//!
//! Identity comes from an upstream provider; this service only mints and
//! checks its own bearer tokens.

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// - /api/auth/session: public
/// - /api/auth/me, /api/auth/logout: bearer token required
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/session", post(handler::create_session))
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/logout", post(handler::logout))
}
