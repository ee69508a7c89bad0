use crate::{database::Database, error::AppError, models::UserSummary};

pub async fn list(db: &Database) -> Result<Vec<UserSummary>, AppError> {
    let users = sqlx::query_as::<_, UserSummary>("SELECT id, username, email FROM users ORDER BY id")
        .fetch_all(&db.pool)
        .await?;
    Ok(users)
}

pub async fn get(db: &Database, id: i64) -> Result<UserSummary, AppError> {
    find_summary(db, id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

pub async fn find_summary(db: &Database, id: i64) -> Result<Option<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>("SELECT id, username, email FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.pool)
        .await
}
