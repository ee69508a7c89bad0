use sqlx::FromRow;
use tracing::info;

use crate::{
    database::Database,
    error::{AppError, FieldErrors},
    middleware::AuthUser,
    models::{Ticket, TicketUpdate},
    services::{ledger, performances},
};

#[derive(FromRow)]
struct OwnedTicket {
    #[sqlx(flatten)]
    ticket: Ticket,
    owner_id: i64,
}

const OWNED_TICKET_SQL: &str = r#"SELECT t.id, t."row", t.seat, t.performance_id, t.reservation_id,
            t.is_booked, r.user_id AS owner_id
     FROM tickets t
     JOIN reservations r ON r.id = t.reservation_id"#;

/// Admins see every ticket, everyone else the tickets of their own reservations.
pub async fn list(db: &Database, principal: &AuthUser) -> Result<Vec<Ticket>, AppError> {
    let rows = sqlx::query_as::<_, OwnedTicket>(&format!(
        "{OWNED_TICKET_SQL} WHERE ($1::int8 IS NULL OR r.user_id = $1) ORDER BY t.id"
    ))
    .bind(principal.owner_scope())
    .fetch_all(&db.pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.ticket).collect())
}

async fn find_visible(db: &Database, principal: &AuthUser, id: i64) -> Result<Ticket, AppError> {
    let row = sqlx::query_as::<_, OwnedTicket>(&format!("{OWNED_TICKET_SQL} WHERE t.id = $1"))
        .bind(id)
        .fetch_optional(&db.pool)
        .await?;

    row.filter(|r| principal.can_access(r.owner_id))
        .map(|r| r.ticket)
        .ok_or_else(|| AppError::not_found("Ticket"))
}

pub async fn get(db: &Database, principal: &AuthUser, id: i64) -> Result<Ticket, AppError> {
    find_visible(db, principal, id).await
}

/// Moves a ticket to another seat of the same performance.
pub async fn update(
    db: &Database,
    principal: &AuthUser,
    id: i64,
    update: TicketUpdate,
) -> Result<Ticket, AppError> {
    let current = find_visible(db, principal, id).await?;

    let seating = performances::find_seating(db, current.performance_id)
        .await?
        .ok_or_else(|| AppError::not_found("Performance"))?;
    if !seating.hall.is_valid_seat(update.row, update.seat) {
        let mut errors = FieldErrors::new();
        if !(1..=seating.hall.rows).contains(&update.row) {
            errors.add("row", format!("Row {} is out of bounds.", update.row));
        }
        if !(1..=seating.hall.seats_in_row).contains(&update.seat) {
            errors.add("seat", format!("Seat {} in row {} is out of bounds.", update.seat, update.row));
        }
        return Err(AppError::Validation(errors));
    }

    let moved = (current.row, current.seat) != (update.row, update.seat);
    if moved && ledger::is_seat_taken(&db.pool, current.performance_id, update.row, update.seat).await? {
        return Err(AppError::Conflict(ledger::seat_conflict_message(update.row, update.seat)));
    }

    let ticket = sqlx::query_as::<_, Ticket>(
        r#"UPDATE tickets SET "row" = $2, seat = $3
           WHERE id = $1
           RETURNING id, "row", seat, performance_id, reservation_id, is_booked"#,
    )
    .bind(id)
    .bind(update.row)
    .bind(update.seat)
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        if ledger::is_seat_conflict(&e) {
            AppError::Conflict(ledger::seat_conflict_message(update.row, update.seat))
        } else {
            AppError::Database(e)
        }
    })?;

    if let Some(summary) = performances::summary(db, ticket.performance_id).await? {
        info!("Ticket {} moved: {}", ticket.id, ticket.label(&summary));
    }
    Ok(ticket)
}

pub async fn delete(db: &Database, principal: &AuthUser, id: i64) -> Result<(), AppError> {
    let ticket = find_visible(db, principal, id).await?;
    sqlx::query("DELETE FROM tickets WHERE id = $1")
        .bind(ticket.id)
        .execute(&db.pool)
        .await?;
    Ok(())
}

/// Tickets cannot be created directly: performance and reservation are read-only.
pub fn reject_direct_create() -> AppError {
    let mut errors = FieldErrors::new();
    errors.add("performance", "This field is read-only; tickets are issued by creating a reservation.");
    errors.add("reservation", "This field is read-only; tickets are issued by creating a reservation.");
    AppError::Validation(errors)
}
