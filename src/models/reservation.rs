use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::{Ticket, UserSummary};

#[derive(Debug, Clone, FromRow)]
pub struct Reservation {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}

/// Requested seat coordinate, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatRequest {
    pub row: i32,
    pub seat: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreateReservation {
    pub performance_id: i64,
    pub seats: Vec<SeatRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReservationDetail {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
    pub tickets: Vec<Ticket>,
}

impl fmt::Display for ReservationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reservation #{} by {}", self.id, self.user.username)
    }
}
