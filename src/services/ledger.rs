//! Ticket ledger: which (performance, row, seat) triples are occupied.
//!
//! The composite unique constraint on `tickets` is the authority on
//! occupancy. Lookups here are read-only pre-checks; `reserve` is the only
//! write and reports a lost race as [`AppError::Conflict`].

use sqlx::{Executor, Postgres};
use std::collections::HashSet;

use crate::{
    error::AppError,
    models::{SeatRequest, Ticket},
};

pub const SEAT_UNIQUE_CONSTRAINT: &str = "tickets_performance_row_seat_key";

/// True when the error is the storage layer rejecting a second claim on a seat.
pub fn is_seat_conflict(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation()
                && db_err.constraint().map_or(true, |c| c == SEAT_UNIQUE_CONSTRAINT)
        }
        _ => false,
    }
}

pub fn seat_conflict_message(row: i32, seat: i32) -> String {
    format!("Seat {seat} in row {row} is already reserved.")
}

pub async fn is_seat_taken<'e, E>(
    executor: E,
    performance_id: i64,
    row: i32,
    seat: i32,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS(
             SELECT 1 FROM tickets
             WHERE performance_id = $1 AND "row" = $2 AND seat = $3
           )"#,
    )
    .bind(performance_id)
    .bind(row)
    .bind(seat)
    .fetch_one(executor)
    .await
}

/// Subset of `seats` already held by some ticket of the performance.
pub async fn taken_seats<'e, E>(
    executor: E,
    performance_id: i64,
    seats: &[SeatRequest],
) -> Result<HashSet<SeatRequest>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    if seats.is_empty() {
        return Ok(HashSet::new());
    }

    let rows: Vec<i32> = seats.iter().map(|s| s.row).collect();
    let numbers: Vec<i32> = seats.iter().map(|s| s.seat).collect();

    let taken = sqlx::query_as::<_, (i32, i32)>(
        r#"SELECT t."row", t.seat
           FROM tickets t
           JOIN UNNEST($2::int4[], $3::int4[]) AS req("row", seat)
             ON req."row" = t."row" AND req.seat = t.seat
           WHERE t.performance_id = $1"#,
    )
    .bind(performance_id)
    .bind(rows)
    .bind(numbers)
    .fetch_all(executor)
    .await?;

    Ok(taken
        .into_iter()
        .map(|(row, seat)| SeatRequest { row, seat })
        .collect())
}

pub async fn occupied_seats<'e, E>(executor: E, performance_id: i64) -> Result<Vec<SeatRequest>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let seats = sqlx::query_as::<_, (i32, i32)>(
        r#"SELECT "row", seat FROM tickets
           WHERE performance_id = $1
           ORDER BY "row", seat"#,
    )
    .bind(performance_id)
    .fetch_all(executor)
    .await?;

    Ok(seats.into_iter().map(|(row, seat)| SeatRequest { row, seat }).collect())
}

/// Inserts one ticket. A concurrent claim on the same seat surfaces as `Conflict`.
pub async fn reserve<'e, E>(
    executor: E,
    performance_id: i64,
    reservation_id: i64,
    row: i32,
    seat: i32,
) -> Result<Ticket, AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as::<_, Ticket>(
        r#"INSERT INTO tickets ("row", seat, performance_id, reservation_id, is_booked)
           VALUES ($1, $2, $3, $4, TRUE)
           RETURNING id, "row", seat, performance_id, reservation_id, is_booked"#,
    )
    .bind(row)
    .bind(seat)
    .bind(performance_id)
    .bind(reservation_id)
    .fetch_one(executor)
    .await
    .map_err(|e| {
        if is_seat_conflict(&e) {
            AppError::Conflict(seat_conflict_message(row, seat))
        } else {
            AppError::Database(e)
        }
    })
}
