use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::{
    error::AppError,
    middleware::{AdminUser, AuthUser},
    models::PerformancePayload,
    pagination::PageRequest,
    services::performances::{self, PerformanceQuery},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/performances", get(list_performances).post(create_performance))
        .route(
            "/performances/{id}",
            get(get_performance).put(update_performance).delete(delete_performance),
        )
        .route("/performances/{id}/seats", get(seat_availability))
}

// GET /api/performances?play=&theatre_hall=&show_time=&search=&ordering=&page=&page_size=
async fn list_performances(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    query: Result<Query<PerformanceQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let page = PageRequest::resolve(&query.page_params(), &state.config.pagination);
    Ok(Json(performances::list(&state.db, &query, page).await?))
}

async fn create_performance(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    payload: Result<Json<PerformancePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let performance = performances::create(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(performance)))
}

async fn get_performance(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(performances::get(&state.db, id).await?))
}

async fn update_performance(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    payload: Result<Json<PerformancePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    Ok(Json(performances::update(&state.db, id, payload).await?))
}

async fn delete_performance(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    performances::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/performances/{id}/seats - занятые места, доступно любому пользователю
async fn seat_availability(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.reservations.seat_availability(id).await?))
}
