use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::info;

use crate::{
    database::Database,
    error::{AppError, FieldErrors},
    models::{
        performance::validate_show_time, Performance, PerformancePayload, PerformanceSeating,
        PerformanceSummary, TheatreHall,
    },
    pagination::{PageParams, PageRequest, Paginated},
};

/// Query string of `GET /performances`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PerformanceQuery {
    pub play: Option<i64>,
    pub theatre_hall: Option<i64>,
    pub show_time: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PerformanceQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams { page: self.page, page_size: self.page_size }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingField {
    ShowTime,
    PlayTitle,
}

impl OrderingField {
    fn column(self) -> &'static str {
        match self {
            OrderingField::ShowTime => "p.show_time",
            OrderingField::PlayTitle => "pl.title",
        }
    }
}

/// Parses `ordering=show_time,-play__title`; unknown fields are ignored.
pub fn parse_ordering(raw: Option<&str>) -> Vec<(OrderingField, bool)> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter_map(|term| {
            let (descending, name) = match term.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, term),
            };
            let field = match name {
                "show_time" => OrderingField::ShowTime,
                "play__title" => OrderingField::PlayTitle,
                _ => return None,
            };
            Some((field, descending))
        })
        .collect()
}

pub fn order_by_clause(ordering: &[(OrderingField, bool)]) -> String {
    let mut terms: Vec<String> = ordering
        .iter()
        .map(|(field, descending)| {
            format!("{} {}", field.column(), if *descending { "DESC" } else { "ASC" })
        })
        .collect();
    if terms.is_empty() {
        terms.push("p.show_time ASC".to_string());
    }
    terms.push("p.id ASC".to_string());
    terms.join(", ")
}

/// `%term%` for ILIKE with the wildcard characters of `term` escaped.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const FROM_PERFORMANCES: &str =
    " FROM performances p JOIN plays pl ON pl.id = p.play_id WHERE TRUE";

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &PerformanceQuery) {
    if let Some(play) = query.play {
        qb.push(" AND p.play_id = ").push_bind(play);
    }
    if let Some(hall) = query.theatre_hall {
        qb.push(" AND p.theatre_hall_id = ").push_bind(hall);
    }
    if let Some(show_time) = query.show_time {
        qb.push(" AND p.show_time = ").push_bind(show_time);
    }
    // каждое слово поиска должно встретиться в названии
    for term in query.search.as_deref().unwrap_or_default().split_whitespace() {
        qb.push(" AND pl.title ILIKE ").push_bind(like_pattern(term));
    }
}

pub fn build_count_query(query: &PerformanceQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    qb.push(FROM_PERFORMANCES);
    push_filters(&mut qb, query);
    qb
}

pub fn build_list_query(query: &PerformanceQuery, page: PageRequest) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT p.id, p.play_id, p.theatre_hall_id, p.show_time");
    qb.push(FROM_PERFORMANCES);
    push_filters(&mut qb, query);
    qb.push(" ORDER BY ")
        .push(order_by_clause(&parse_ordering(query.ordering.as_deref())))
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    qb
}

pub async fn list(
    db: &Database,
    query: &PerformanceQuery,
    page: PageRequest,
) -> Result<Paginated<Performance>, AppError> {
    let count = build_count_query(query)
        .build_query_scalar::<i64>()
        .fetch_one(&db.pool)
        .await?;

    let results = build_list_query(query, page)
        .build_query_as::<Performance>()
        .fetch_all(&db.pool)
        .await?;

    Paginated::new(page, count, results)
}

pub async fn get(db: &Database, id: i64) -> Result<Performance, AppError> {
    sqlx::query_as::<_, Performance>(
        "SELECT id, play_id, theatre_hall_id, show_time FROM performances WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&db.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Performance"))
}

pub async fn summary(db: &Database, id: i64) -> Result<Option<PerformanceSummary>, sqlx::Error> {
    sqlx::query_as::<_, PerformanceSummary>(
        "SELECT p.id, pl.title AS play_title, p.show_time
         FROM performances p
         JOIN plays pl ON pl.id = p.play_id
         WHERE p.id = $1",
    )
    .bind(id)
    .fetch_optional(&db.pool)
    .await
}

#[derive(FromRow)]
struct SeatingRow {
    performance_id: i64,
    hall_id: i64,
    name: String,
    rows: i32,
    seats_in_row: i32,
}

pub async fn find_seating(db: &Database, performance_id: i64) -> Result<Option<PerformanceSeating>, sqlx::Error> {
    let row = sqlx::query_as::<_, SeatingRow>(
        r#"SELECT p.id AS performance_id, h.id AS hall_id, h.name, h."rows", h.seats_in_row
           FROM performances p
           JOIN theatre_halls h ON h.id = p.theatre_hall_id
           WHERE p.id = $1"#,
    )
    .bind(performance_id)
    .fetch_optional(&db.pool)
    .await?;

    Ok(row.map(|r| PerformanceSeating {
        performance_id: r.performance_id,
        hall: TheatreHall {
            id: r.hall_id,
            name: r.name,
            rows: r.rows,
            seats_in_row: r.seats_in_row,
        },
    }))
}

// Ссылки на пьесу и зал
async fn validate_references(db: &Database, payload: &PerformancePayload) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();

    let play_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM plays WHERE id = $1)")
        .bind(payload.play)
        .fetch_one(&db.pool);
    if !play_exists.await? {
        errors.add("play", format!("Invalid pk \"{}\" - object does not exist.", payload.play));
    }

    let hall_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM theatre_halls WHERE id = $1)")
            .bind(payload.theatre_hall)
            .fetch_one(&db.pool);
    if !hall_exists.await? {
        errors.add(
            "theatre_hall",
            format!("Invalid pk \"{}\" - object does not exist.", payload.theatre_hall),
        );
    }

    errors.into_result()
}

/// Rejects a past show time without touching storage.
pub fn precheck_show_time(payload: &PerformancePayload) -> Result<(), AppError> {
    validate_show_time(payload.show_time, Utc::now()).map_err(AppError::Validation)
}

pub async fn create(db: &Database, payload: PerformancePayload) -> Result<Performance, AppError> {
    precheck_show_time(&payload)?;
    validate_references(db, &payload).await?;

    let performance = sqlx::query_as::<_, Performance>(
        "INSERT INTO performances (play_id, theatre_hall_id, show_time)
         VALUES ($1, $2, $3)
         RETURNING id, play_id, theatre_hall_id, show_time",
    )
    .bind(payload.play)
    .bind(payload.theatre_hall)
    .bind(payload.show_time)
    .fetch_one(&db.pool)
    .await?;

    info!("Performance {} scheduled at {}", performance.id, performance.show_time);
    Ok(performance)
}

pub async fn update(db: &Database, id: i64, payload: PerformancePayload) -> Result<Performance, AppError> {
    precheck_show_time(&payload)?;
    validate_references(db, &payload).await?;

    sqlx::query_as::<_, Performance>(
        "UPDATE performances
         SET play_id = $2, theatre_hall_id = $3, show_time = $4
         WHERE id = $1
         RETURNING id, play_id, theatre_hall_id, show_time",
    )
    .bind(id)
    .bind(payload.play)
    .bind(payload.theatre_hall)
    .bind(payload.show_time)
    .fetch_optional(&db.pool)
    .await?
    .ok_or_else(|| AppError::not_found("Performance"))
}

/// Deleting a performance removes its tickets through the foreign key cascade.
pub async fn delete(db: &Database, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM performances WHERE id = $1")
        .bind(id)
        .execute(&db.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Performance"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_parses_known_fields_only() {
        assert_eq!(
            parse_ordering(Some("-show_time, play__title,unknown")),
            vec![(OrderingField::ShowTime, true), (OrderingField::PlayTitle, false)]
        );
        assert!(parse_ordering(None).is_empty());
        assert!(parse_ordering(Some("price")).is_empty());
    }

    #[test]
    fn default_order_is_show_time_ascending() {
        assert_eq!(order_by_clause(&[]), "p.show_time ASC, p.id ASC");
        assert_eq!(
            order_by_clause(&[(OrderingField::PlayTitle, true)]),
            "pl.title DESC, p.id ASC"
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ham"), "%ham%");
        assert_eq!(like_pattern("100%_"), "%100\\%\\_%");
    }

    #[test]
    fn list_query_contains_requested_filters() {
        let query = PerformanceQuery {
            play: Some(1),
            search: Some("  hamlet ".into()),
            ordering: Some("-play__title".into()),
            ..Default::default()
        };
        let qb = build_list_query(&query, PageRequest { number: 2, size: 10 });
        let sql = qb.sql();
        assert!(sql.contains("p.play_id = $1"));
        assert!(sql.contains("pl.title ILIKE $2"));
        assert!(!sql.contains("p.theatre_hall_id ="));
        assert!(sql.contains("ORDER BY pl.title DESC, p.id ASC LIMIT $3 OFFSET $4"));
    }

    #[test]
    fn every_search_term_must_match() {
        let query = PerformanceQuery { search: Some(" king  lear ".into()), ..Default::default() };
        let qb = build_count_query(&query);
        assert!(qb.sql().ends_with("WHERE TRUE AND pl.title ILIKE $1 AND pl.title ILIKE $2"));
    }

    #[test]
    fn blank_search_adds_no_filter() {
        let query = PerformanceQuery { search: Some("   ".into()), ..Default::default() };
        let qb = build_count_query(&query);
        assert!(!qb.sql().contains("ILIKE"));
    }

    #[test]
    fn query_string_deserializes() {
        let query: PerformanceQuery = serde_urlencoded::from_str(
            "theatre_hall=2&show_time=2030-01-01T19:00:00Z&page=2&page_size=5",
        )
        .unwrap();
        assert_eq!(query.theatre_hall, Some(2));
        assert!(query.show_time.is_some());
        assert_eq!(query.page_params().page_size, Some(5));
    }
}
