use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{error::AppError, middleware::AdminUser, models::GenrePayload, services::catalog, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/genres", get(list_genres).post(create_genre))
        .route("/genres/{id}", get(get_genre).put(update_genre).delete(delete_genre))
}

async fn list_genres(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_genres(&state.db).await?))
}

async fn create_genre(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    payload: Result<Json<GenrePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let genre = catalog::create_genre(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

async fn get_genre(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::get_genre(&state.db, id).await?))
}

async fn update_genre(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    payload: Result<Json<GenrePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    Ok(Json(catalog::update_genre(&state.db, id, payload).await?))
}

async fn delete_genre(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_genre(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
