pub mod actors;
pub mod auth;
pub mod genres;
pub mod performances;
pub mod plays;
pub mod reservations;
pub mod theatre_halls;
pub mod tickets;
pub mod users;

use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<crate::AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(plays::routes())
        .merge(actors::routes())
        .merge(genres::routes())
        .merge(theatre_halls::routes())
        .merge(performances::routes())
        .merge(reservations::routes())
        .merge(tickets::routes())
        .merge(users::routes())
}
