use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

/// A venue with a fixed grid of `rows` x `seats_in_row` seats.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TheatreHall {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl TheatreHall {
    pub fn capacity(&self) -> i64 {
        i64::from(self.rows) * i64::from(self.seats_in_row)
    }

    /// Seat coordinates are 1-based: `[1..=rows] x [1..=seats_in_row]`.
    pub fn is_valid_seat(&self, row: i32, seat: i32) -> bool {
        (1..=self.rows).contains(&row) && (1..=self.seats_in_row).contains(&seat)
    }
}

pub fn is_valid_seat(hall: &TheatreHall, row: i32, seat: i32) -> bool {
    hall.is_valid_seat(row, seat)
}

impl fmt::Display for TheatreHall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Serialize)]
pub struct TheatreHallResponse {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub capacity: i64,
}

impl From<TheatreHall> for TheatreHallResponse {
    fn from(hall: TheatreHall) -> Self {
        Self {
            capacity: hall.capacity(),
            id: hall.id,
            name: hall.name,
            rows: hall.rows,
            seats_in_row: hall.seats_in_row,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct TheatreHallPayload {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters."))]
    pub name: String,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub rows: i32,
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub seats_in_row: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hall(rows: i32, seats_in_row: i32) -> TheatreHall {
        TheatreHall { id: 1, name: "Main Hall".into(), rows, seats_in_row }
    }

    #[test]
    fn corners_are_valid() {
        let h = hall(10, 20);
        assert!(is_valid_seat(&h, 1, 1));
        assert!(is_valid_seat(&h, 10, 20));
        assert!(is_valid_seat(&h, 1, 20));
        assert!(is_valid_seat(&h, 10, 1));
    }

    #[test]
    fn zero_and_overflow_are_invalid() {
        let h = hall(10, 20);
        assert!(!is_valid_seat(&h, 0, 1));
        assert!(!is_valid_seat(&h, 1, 0));
        assert!(!is_valid_seat(&h, 11, 1));
        assert!(!is_valid_seat(&h, 1, 21));
        assert!(!is_valid_seat(&h, 100, 1));
        assert!(!is_valid_seat(&h, -1, -1));
    }

    #[test]
    fn capacity_and_display() {
        let h = hall(10, 20);
        assert_eq!(h.capacity(), 200);
        assert_eq!(h.to_string(), "Main Hall");
        assert_eq!(TheatreHallResponse::from(h).capacity, 200);
    }

    #[test]
    fn payload_requires_positive_geometry() {
        let payload = TheatreHallPayload { name: "Small".into(), rows: 0, seats_in_row: -3 };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("rows"));
        assert!(fields.contains_key("seats_in_row"));
    }

    proptest! {
        #[test]
        fn validity_matches_bounds(
            rows in 1i32..50,
            seats in 1i32..50,
            row in -5i32..60,
            seat in -5i32..60,
        ) {
            let h = hall(rows, seats);
            let expected = row >= 1 && row <= rows && seat >= 1 && seat <= seats;
            prop_assert_eq!(is_valid_seat(&h, row, seat), expected);
        }
    }
}
