use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{error::AppError, middleware::AdminUser, models::ActorPayload, services::catalog, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/actors", get(list_actors).post(create_actor))
        .route("/actors/{id}", get(get_actor).put(update_actor).delete(delete_actor))
}

async fn list_actors(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::list_actors(&state.db).await?))
}

async fn create_actor(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    payload: Result<Json<ActorPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    let actor = catalog::create_actor(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(actor)))
}

async fn get_actor(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(catalog::get_actor(&state.db, id).await?))
}

async fn update_actor(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    payload: Result<Json<ActorPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;
    Ok(Json(catalog::update_actor(&state.db, id, payload).await?))
}

async fn delete_actor(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    catalog::delete_actor(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
