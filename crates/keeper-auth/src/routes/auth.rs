//! Register and login (spec §4.1) — the only two operations this service
//! exposes.

use axum::{extract::State, routing::post, Json, Router};
use keeper_common::{
    error::{KeeperError, KeeperResult},
    models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    validation::validate_request,
};
use keeper_db::repository::{apps, users};
use std::sync::Arc;

use crate::{auth, AppState};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// POST /auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> KeeperResult<Json<RegisterResponse>> {
    validate_request(&body)?;

    let password_hash = auth::hash_password(&body.password)
        .map_err(|e| KeeperError::Internal(anyhow::anyhow!("{e}")))?;

    let user_id = users::create_user(&state.db.pool, &body.email, &password_hash).await?;

    tracing::info!(user_id, "user registered");

    Ok(Json(RegisterResponse { user_id }))
}

/// POST /auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> KeeperResult<Json<LoginResponse>> {
    validate_request(&body)?;

    let user = users::find_by_login(&state.db.pool, &body.email)
        .await?
        .ok_or(KeeperError::InvalidCredentials)?;

    let valid = auth::verify_password(&body.password, &user.password_hash)
        .map_err(|_| KeeperError::InvalidCredentials)?;
    if !valid {
        return Err(KeeperError::InvalidCredentials);
    }

    let app = apps::find_by_id(&state.db.pool, body.app_id)
        .await
        .map_err(|_| KeeperError::InvalidCredentials)?;

    let config = keeper_common::config::get();
    let token = keeper_common::auth::issue(user.id, app.id, &app.secret, config.token_ttl_secs)
        .map_err(|e| KeeperError::Internal(e.into()))?;

    tracing::info!(user_id = user.id, app_id = app.id, "user logged in");

    Ok(Json(LoginResponse { token }))
}
