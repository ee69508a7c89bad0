use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use super::TheatreHall;
use crate::error::FieldErrors;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Performance {
    pub id: i64,
    #[serde(rename = "play")]
    pub play_id: i64,
    #[serde(rename = "theatre_hall")]
    pub theatre_hall_id: i64,
    pub show_time: DateTime<Utc>,
}

/// Performance joined with its play title, used for display strings.
#[derive(Debug, Clone, FromRow)]
pub struct PerformanceSummary {
    pub id: i64,
    pub play_title: String,
    pub show_time: DateTime<Utc>,
}

impl fmt::Display for PerformanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.play_title, self.show_time)
    }
}

/// A performance together with the seat geometry of its hall.
#[derive(Debug, Clone)]
pub struct PerformanceSeating {
    pub performance_id: i64,
    pub hall: TheatreHall,
}

#[derive(Debug, Deserialize)]
pub struct PerformancePayload {
    pub play: i64,
    pub theatre_hall: i64,
    pub show_time: DateTime<Utc>,
}

pub fn validate_show_time(show_time: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), FieldErrors> {
    if show_time <= now {
        return Err(FieldErrors::single("show_time", "Show time cannot be in the past"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn past_show_time_is_rejected() {
        let now = Utc::now();
        let errors = validate_show_time(now - Duration::hours(1), now).unwrap_err();
        assert_eq!(errors.get("show_time").unwrap()[0], "Show time cannot be in the past");
    }

    #[test]
    fn show_time_must_be_strictly_in_the_future() {
        let now = Utc::now();
        assert!(validate_show_time(now, now).is_err());
        assert!(validate_show_time(now + Duration::days(2), now).is_ok());
    }

    #[test]
    fn serializes_foreign_keys_by_relation_name() {
        let performance = Performance {
            id: 3,
            play_id: 1,
            theatre_hall_id: 2,
            show_time: Utc::now(),
        };
        let body = serde_json::to_value(&performance).unwrap();
        assert_eq!(body["play"], 1);
        assert_eq!(body["theatre_hall"], 2);
    }

    #[test]
    fn summary_display() {
        let show_time = DateTime::parse_from_rfc3339("2030-05-01T19:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let summary = PerformanceSummary { id: 1, play_title: "Hamlet".into(), show_time };
        assert_eq!(summary.to_string(), "Hamlet at 2030-05-01 19:00:00 UTC");
    }
}
