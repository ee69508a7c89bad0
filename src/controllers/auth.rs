use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppError,
    models::{RefreshRequest, RegisterPayload, TokenRequest},
    services::auth,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
}

// POST /api/register
async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = auth::register(&state.db, state.config.security.bcrypt_cost, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// POST /api/token
async fn obtain_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let pair = auth::obtain_token_pair(&state.db, &state.tokens, request).await?;
    Ok(Json(pair))
}

// POST /api/token/refresh
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    Ok(Json(state.tokens.refresh(&request.refresh)?))
}
