use tracing::info;

use crate::{
    database::Database,
    error::AppError,
    models::{TheatreHall, TheatreHallPayload},
};

const HALL_COLUMNS: &str = r#"id, name, "rows", seats_in_row"#;

pub async fn list(db: &Database) -> Result<Vec<TheatreHall>, AppError> {
    let halls = sqlx::query_as::<_, TheatreHall>(&format!(
        "SELECT {HALL_COLUMNS} FROM theatre_halls ORDER BY id"
    ))
    .fetch_all(&db.pool)
    .await?;
    Ok(halls)
}

pub async fn get(db: &Database, id: i64) -> Result<TheatreHall, AppError> {
    sqlx::query_as::<_, TheatreHall>(&format!(
        "SELECT {HALL_COLUMNS} FROM theatre_halls WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&db.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Theatre hall"))
}

pub async fn create(db: &Database, payload: TheatreHallPayload) -> Result<TheatreHall, AppError> {
    let hall = sqlx::query_as::<_, TheatreHall>(&format!(
        r#"INSERT INTO theatre_halls (name, "rows", seats_in_row)
           VALUES ($1, $2, $3)
           RETURNING {HALL_COLUMNS}"#
    ))
    .bind(&payload.name)
    .bind(payload.rows)
    .bind(payload.seats_in_row)
    .fetch_one(&db.pool)
    .await?;

    info!("Theatre hall {} created with {} seats", hall, hall.capacity());
    Ok(hall)
}

// Уже выданные билеты при изменении размеров не пересаживаются
pub async fn update(db: &Database, id: i64, payload: TheatreHallPayload) -> Result<TheatreHall, AppError> {
    sqlx::query_as::<_, TheatreHall>(&format!(
        r#"UPDATE theatre_halls
           SET name = $2, "rows" = $3, seats_in_row = $4
           WHERE id = $1
           RETURNING {HALL_COLUMNS}"#
    ))
    .bind(id)
    .bind(&payload.name)
    .bind(payload.rows)
    .bind(payload.seats_in_row)
    .fetch_optional(&db.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Theatre hall"))
}

pub async fn delete(db: &Database, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM theatre_halls WHERE id = $1")
        .bind(id)
        .execute(&db.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Theatre hall"));
    }
    Ok(())
}
