//! reservations.rs
//!
//! Бронирование мест на спектакль.
//!
//! 1. Спектакль и геометрия зала загружаются по `performance_id`.
//! 2. Все запрошенные места проверяются за один проход: границы зала,
//!    повтор внутри запроса, занятость по реестру билетов. Ошибки копятся
//!    и возвращаются вместе.
//! 3. Бронь и билеты пишутся одной транзакцией. Уникальный индекс
//!    `(performance_id, row, seat)` ловит гонку между проверкой и вставкой.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, Postgres, Transaction};
use std::collections::{HashMap, HashSet};
use tracing::{error, info, warn};

use crate::{
    database::Database,
    error::{AppError, FieldErrors},
    middleware::AuthUser,
    models::{
        CreateReservation, Reservation, ReservationDetail, SeatRequest, TheatreHall, Ticket,
        UserSummary,
    },
    services::{ledger, performances, users},
};

const SEATS_FIELD: &str = "seats";

#[derive(Clone)]
pub struct ReservationService {
    db: Database,
}

#[derive(Debug, FromRow)]
struct ReservationRow {
    id: i64,
    created_at: DateTime<Utc>,
    user_id: i64,
    username: String,
    email: String,
}

impl ReservationRow {
    fn into_detail(self, tickets: Vec<Ticket>) -> ReservationDetail {
        ReservationDetail {
            id: self.id,
            created_at: self.created_at,
            user: UserSummary { id: self.user_id, username: self.username, email: self.email },
            tickets,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SeatAvailability {
    pub performance: i64,
    pub rows: i32,
    pub seats_in_row: i32,
    pub taken: Vec<SeatRequest>,
    pub available: i64,
}

impl SeatAvailability {
    /// Tickets left outside a hall that has since shrunk stay in `taken`
    /// but do not reduce `available`.
    pub fn new(performance: i64, hall: &TheatreHall, taken: Vec<SeatRequest>) -> Self {
        let occupied = taken
            .iter()
            .filter(|s| hall.is_valid_seat(s.row, s.seat))
            .count() as i64;
        Self {
            performance,
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
            available: hall.capacity() - occupied,
            taken,
        }
    }
}

/// In-bounds seats of the request, first occurrence only, in request order.
/// These are the only seats worth asking the ledger about.
pub fn seats_within_hall(hall: &TheatreHall, seats: &[SeatRequest]) -> Vec<SeatRequest> {
    let mut seen = HashSet::new();
    seats
        .iter()
        .filter(|s| hall.is_valid_seat(s.row, s.seat))
        .filter(|s| seen.insert(**s))
        .copied()
        .collect()
}

/// Walks the request once, in order, and collects every problem.
pub fn collect_seat_errors(
    hall: &TheatreHall,
    seats: &[SeatRequest],
    taken: &HashSet<SeatRequest>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if seats.is_empty() {
        errors.add(SEATS_FIELD, "This list may not be empty.");
        return errors;
    }

    let mut seen = HashSet::new();
    for requested in seats {
        let SeatRequest { row, seat } = *requested;
        if !(1..=hall.rows).contains(&row) {
            errors.add(SEATS_FIELD, format!("Row {row} is out of bounds."));
        } else if !(1..=hall.seats_in_row).contains(&seat) {
            errors.add(SEATS_FIELD, format!("Seat {seat} in row {row} is out of bounds."));
        } else if !seen.insert(*requested) {
            errors.add(SEATS_FIELD, format!("Seat {seat} in row {row} is requested more than once."));
        } else if taken.contains(requested) {
            errors.add(SEATS_FIELD, ledger::seat_conflict_message(row, seat));
        }
    }
    errors
}

impl ReservationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        principal: &AuthUser,
        request: CreateReservation,
    ) -> Result<ReservationDetail, AppError> {
        let seating = performances::find_seating(&self.db, request.performance_id)
            .await?
            .ok_or_else(|| AppError::not_found("Performance"))?;

        // Предварительная проверка: только ради понятных сообщений об ошибках
        let candidates = seats_within_hall(&seating.hall, &request.seats);
        let taken = ledger::taken_seats(&self.db.pool, seating.performance_id, &candidates).await?;
        collect_seat_errors(&seating.hall, &request.seats, &taken).into_result()?;

        let user = users::find_summary(&self.db, principal.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let mut tx = self.db.pool.begin().await?;
        let written = Self::write(&mut tx, principal.user_id, seating.performance_id, &request.seats).await;

        let (reservation, tickets) = match written {
            Ok(written) => {
                if let Err(e) = tx.commit().await {
                    error!("Failed to commit reservation for user {}: {:?}", principal.user_id, e);
                    return Err(Self::as_conflict(AppError::Database(e)));
                }
                written
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("Reservation rollback failed: {:?}", rollback_err);
                }
                return Err(Self::as_conflict(e));
            }
        };

        let detail = ReservationDetail {
            id: reservation.id,
            created_at: reservation.created_at,
            user,
            tickets,
        };
        info!(
            "{} for performance {}: {} ticket(s)",
            detail,
            seating.performance_id,
            detail.tickets.len()
        );
        Ok(detail)
    }

    // Бронь и билеты в порядке запроса
    async fn write(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        performance_id: i64,
        seats: &[SeatRequest],
    ) -> Result<(Reservation, Vec<Ticket>), AppError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            "INSERT INTO reservations (user_id) VALUES ($1)
             RETURNING id, created_at, user_id",
        )
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;

        let mut tickets = Vec::with_capacity(seats.len());
        for seat in seats {
            let ticket = ledger::reserve(&mut **tx, performance_id, reservation.id, seat.row, seat.seat).await?;
            tickets.push(ticket);
        }

        Ok((reservation, tickets))
    }

    /// Any failure of the write transaction is reported as a retryable conflict.
    fn as_conflict(err: AppError) -> AppError {
        match err {
            AppError::Conflict(message) => {
                warn!("Reservation lost a seat race: {}", message);
                AppError::Conflict(message)
            }
            other => {
                error!("Reservation transaction failed: {}", other);
                AppError::Conflict(
                    "The reservation could not be completed; one or more seats may already be reserved. Please retry."
                        .to_string(),
                )
            }
        }
    }

    pub async fn list(&self, principal: &AuthUser) -> Result<Vec<ReservationDetail>, AppError> {
        let rows = sqlx::query_as::<_, ReservationRow>(
            "SELECT r.id, r.created_at, u.id AS user_id, u.username, u.email
             FROM reservations r
             JOIN users u ON u.id = r.user_id
             WHERE ($1::int8 IS NULL OR r.user_id = $1)
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(principal.owner_scope())
        .fetch_all(&self.db.pool)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut by_reservation: HashMap<i64, Vec<Ticket>> = HashMap::new();
        for ticket in self.tickets_of(&ids).await? {
            by_reservation.entry(ticket.reservation_id).or_default().push(ticket);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let tickets = by_reservation.remove(&row.id).unwrap_or_default();
                row.into_detail(tickets)
            })
            .collect())
    }

    pub async fn get(&self, principal: &AuthUser, id: i64) -> Result<ReservationDetail, AppError> {
        let row = self.find_visible(principal, id).await?;
        let tickets = self.tickets_of(&[row.id]).await?;
        Ok(row.into_detail(tickets))
    }

    /// Deletes the reservation; its tickets go with it.
    pub async fn delete(&self, principal: &AuthUser, id: i64) -> Result<(), AppError> {
        let row = self.find_visible(principal, id).await?;
        sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(row.id)
            .execute(&self.db.pool)
            .await?;
        info!("Reservation {} deleted by user {}", row.id, principal.user_id);
        Ok(())
    }

    pub async fn seat_availability(&self, performance_id: i64) -> Result<SeatAvailability, AppError> {
        let seating = performances::find_seating(&self.db, performance_id)
            .await?
            .ok_or_else(|| AppError::not_found("Performance"))?;
        let taken = ledger::occupied_seats(&self.db.pool, performance_id).await?;

        Ok(SeatAvailability::new(performance_id, &seating.hall, taken))
    }

    // Чужие брони для обычного пользователя не существуют
    async fn find_visible(&self, principal: &AuthUser, id: i64) -> Result<ReservationRow, AppError> {
        let row = sqlx::query_as::<_, ReservationRow>(
            "SELECT r.id, r.created_at, u.id AS user_id, u.username, u.email
             FROM reservations r
             JOIN users u ON u.id = r.user_id
             WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        row.filter(|r| principal.can_access(r.user_id))
            .ok_or_else(|| AppError::not_found("Reservation"))
    }

    async fn tickets_of(&self, reservation_ids: &[i64]) -> Result<Vec<Ticket>, sqlx::Error> {
        if reservation_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Ticket>(
            r#"SELECT id, "row", seat, performance_id, reservation_id, is_booked
               FROM tickets
               WHERE reservation_id = ANY($1)
               ORDER BY id"#,
        )
        .bind(reservation_ids)
        .fetch_all(&self.db.pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hall() -> TheatreHall {
        TheatreHall { id: 1, name: "Main Hall".into(), rows: 10, seats_in_row: 20 }
    }

    fn seat(row: i32, seat: i32) -> SeatRequest {
        SeatRequest { row, seat }
    }

    #[test]
    fn valid_request_has_no_errors() {
        let errors = collect_seat_errors(&hall(), &[seat(1, 1), seat(1, 2)], &HashSet::new());
        assert!(errors.is_empty());
    }

    #[test]
    fn every_bounds_violation_is_reported() {
        let errors = collect_seat_errors(&hall(), &[seat(100, 1), seat(1, 100)], &HashSet::new());
        let messages = errors.get("seats").unwrap();
        assert_eq!(
            messages,
            ["Row 100 is out of bounds.", "Seat 100 in row 1 is out of bounds."]
        );
    }

    #[test]
    fn taken_and_out_of_bounds_seats_are_reported_together_in_request_order() {
        let taken: HashSet<_> = [seat(2, 2)].into_iter().collect();
        let errors = collect_seat_errors(
            &hall(),
            &[seat(2, 2), seat(0, 5), seat(3, 3), seat(10, 21)],
            &taken,
        );
        assert_eq!(
            errors.get("seats").unwrap(),
            [
                "Seat 2 in row 2 is already reserved.",
                "Row 0 is out of bounds.",
                "Seat 21 in row 10 is out of bounds.",
            ]
        );
    }

    #[test]
    fn duplicate_seat_in_one_request_is_rejected() {
        let errors = collect_seat_errors(&hall(), &[seat(4, 4), seat(4, 4)], &HashSet::new());
        assert_eq!(
            errors.get("seats").unwrap(),
            ["Seat 4 in row 4 is requested more than once."]
        );
    }

    #[test]
    fn empty_request_is_rejected() {
        let errors = collect_seat_errors(&hall(), &[], &HashSet::new());
        assert_eq!(errors.get("seats").unwrap(), ["This list may not be empty."]);
    }

    #[test]
    fn only_in_bounds_unique_seats_reach_the_ledger() {
        let candidates = seats_within_hall(
            &hall(),
            &[seat(5, 5), seat(0, 1), seat(5, 5), seat(1, 21), seat(10, 20)],
        );
        assert_eq!(candidates, vec![seat(5, 5), seat(10, 20)]);
    }

    #[test]
    fn availability_ignores_seats_outside_a_shrunk_hall() {
        let small = TheatreHall { id: 1, name: "Studio".into(), rows: 2, seats_in_row: 2 };
        let availability =
            SeatAvailability::new(7, &small, vec![seat(1, 1), seat(3, 1), seat(2, 5), seat(9, 9)]);
        assert_eq!(availability.available, 3);
        assert_eq!(availability.taken.len(), 4);
        assert_eq!((availability.rows, availability.seats_in_row), (2, 2));
    }

    #[test]
    fn non_conflict_failures_become_retryable_conflicts() {
        let err = ReservationService::as_conflict(AppError::Database(sqlx::Error::PoolTimedOut));
        match err {
            AppError::Conflict(message) => assert!(message.contains("already be reserved")),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = ReservationService::as_conflict(AppError::Conflict(
            ledger::seat_conflict_message(1, 1),
        ));
        assert!(matches!(err, AppError::Conflict(m) if m == "Seat 1 in row 1 is already reserved."));
    }
}
