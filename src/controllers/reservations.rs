use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use crate::{error::AppError, middleware::AuthUser, models::CreateReservation, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/{id}", get(get_reservation).delete(delete_reservation))
}

// GET /api/reservations - свои брони, администратор видит все
async fn list_reservations(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.reservations.list(&user).await?))
}

// POST /api/reservations {performance_id, seats: [{row, seat}, ...]}
async fn create_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    payload: Result<Json<CreateReservation>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let reservation = state.reservations.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

async fn get_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.reservations.get(&user, id).await?))
}

async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    state.reservations.delete(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
