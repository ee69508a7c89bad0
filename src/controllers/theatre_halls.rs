use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppError,
    middleware::AdminUser,
    models::{TheatreHallPayload, TheatreHallResponse},
    services::halls,
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/theatre-halls", get(list_halls).post(create_hall))
        .route("/theatre-halls/{id}", get(get_hall).put(update_hall).delete(delete_hall))
}

async fn list_halls(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let halls: Vec<TheatreHallResponse> = halls::list(&state.db)
        .await?
        .into_iter()
        .map(TheatreHallResponse::from)
        .collect();
    Ok(Json(halls))
}

async fn create_hall(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    payload: Result<Json<TheatreHallPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let hall = halls::create(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(TheatreHallResponse::from(hall))))
}

async fn get_hall(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let hall = halls::get(&state.db, id).await?;
    Ok(Json(TheatreHallResponse::from(hall)))
}

async fn update_hall(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    payload: Result<Json<TheatreHallPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let hall = halls::update(&state.db, id, payload).await?;
    Ok(Json(TheatreHallResponse::from(hall)))
}

async fn delete_hall(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    halls::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
