use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{error::AppError, middleware::AdminUser, models::PlayPayload, services::catalog, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/plays", get(list_plays).post(create_play))
        .route("/plays/{id}", get(get_play).put(update_play).delete(delete_play))
}

async fn list_plays(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_plays(&state.db).await?))
}

async fn create_play(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    payload: Result<Json<PlayPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let play = catalog::create_play(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(play)))
}

async fn get_play(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::get_play(&state.db, id).await?))
}

async fn update_play(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    payload: Result<Json<PlayPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    Ok(Json(catalog::update_play(&state.db, id, payload).await?))
}

async fn delete_play(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_play(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
