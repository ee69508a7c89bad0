pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use services::{auth::TokenService, reservations::ReservationService};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub tokens: TokenService,
    pub reservations: ReservationService,
}

impl AppState {
    pub fn new(db: database::Database, config: config::Config) -> Arc<Self> {
        let tokens = TokenService::new(&config.jwt);
        let reservations = ReservationService::new(db.clone());
        Arc::new(Self { db, config, tokens, reservations })
    }

    /// Connects, migrates and bootstraps the administrator account.
    pub async fn connect(config: config::Config) -> Result<Arc<Self>, Box<dyn std::error::Error>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        info!("Database connected");

        db.run_migrations().await?;
        services::auth::ensure_admin(&db, &config.admin, config.security.bcrypt_cost).await?;

        Ok(Self::new(db, config))
    }
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Theatre Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
