use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::PerformanceSummary;

/// A claim on one seat of one performance, owned by a reservation.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    #[serde(rename = "performance")]
    pub performance_id: i64,
    #[serde(rename = "reservation")]
    pub reservation_id: i64,
    pub is_booked: bool,
}

impl Ticket {
    pub fn label(&self, performance: &PerformanceSummary) -> String {
        format!("Row {} Seat {} - {}", self.row, self.seat, performance)
    }
}

// performance и reservation только для чтения
#[derive(Debug, Deserialize, Validate)]
pub struct TicketUpdate {
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub row: i32,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub seat: i32,
}
