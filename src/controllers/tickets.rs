use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::{error::AppError, middleware::AuthUser, models::TicketUpdate, services::tickets, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tickets", get(list_tickets).post(create_ticket))
        .route("/tickets/{id}", get(get_ticket).put(update_ticket).delete(delete_ticket))
}

async fn list_tickets(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(tickets::list(&state.db, &user).await?))
}

// Билеты выдаются только через бронирование
async fn create_ticket(_user: AuthUser) -> Result<StatusCode, AppError> {
    Err(tickets::reject_direct_create())
}

async fn get_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(tickets::get(&state.db, &user, id).await?))
}

async fn update_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    payload: Result<Json<TicketUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(update) = payload?;
    update.validate()?;
    Ok(Json(tickets::update(&state.db, &user, id, update).await?))
}

async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    tickets::delete(&state.db, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
