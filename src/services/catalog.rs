//! catalog.rs
//!
//! Справочники: пьесы, актеры, жанры и связи многие-ко-многим
//! `actor_plays` / `genre_plays`.

use sqlx::{FromRow, PgConnection};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::{
    database::Database,
    error::{AppError, FieldErrors},
    models::{
        Actor, ActorDetail, ActorPayload, Genre, GenreDetail, GenrePayload, Play, PlayDetail,
        PlayPayload,
    },
};

#[derive(Debug, Clone, Copy)]
enum PlayLink {
    Actor,
    Genre,
}

impl PlayLink {
    fn delete_sql(self) -> &'static str {
        match self {
            PlayLink::Actor => "DELETE FROM actor_plays WHERE actor_id = $1",
            PlayLink::Genre => "DELETE FROM genre_plays WHERE genre_id = $1",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            PlayLink::Actor => {
                "INSERT INTO actor_plays (actor_id, play_id) SELECT $1, UNNEST($2::int8[]) ON CONFLICT DO NOTHING"
            }
            PlayLink::Genre => {
                "INSERT INTO genre_plays (genre_id, play_id) SELECT $1, UNNEST($2::int8[]) ON CONFLICT DO NOTHING"
            }
        }
    }
}

#[derive(FromRow)]
struct ActorLink {
    play_id: i64,
    #[sqlx(flatten)]
    actor: Actor,
}

#[derive(FromRow)]
struct GenreLink {
    play_id: i64,
    #[sqlx(flatten)]
    genre: Genre,
}

#[derive(FromRow)]
struct PlayRef {
    owner_id: i64,
    play_id: i64,
    title: String,
}

/// Ids from `requested` that do not name an existing play, in request order.
pub fn missing_ids(requested: &[i64], existing: &HashSet<i64>) -> Vec<i64> {
    let mut reported = HashSet::new();
    requested
        .iter()
        .copied()
        .filter(|id| !existing.contains(id) && reported.insert(*id))
        .collect()
}

async fn ensure_plays_exist(db: &Database, play_ids: &[i64]) -> Result<(), AppError> {
    if play_ids.is_empty() {
        return Ok(());
    }
    let existing: HashSet<i64> = sqlx::query_scalar::<_, i64>("SELECT id FROM plays WHERE id = ANY($1)")
        .bind(play_ids)
        .fetch_all(&db.pool)
        .await?
        .into_iter()
        .collect();

    let mut errors = FieldErrors::new();
    for id in missing_ids(play_ids, &existing) {
        errors.add("plays", format!("Invalid pk \"{id}\" - object does not exist."));
    }
    errors.into_result()
}

async fn replace_links(
    conn: &mut PgConnection,
    link: PlayLink,
    owner_id: i64,
    play_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query(link.delete_sql()).bind(owner_id).execute(&mut *conn).await?;
    if !play_ids.is_empty() {
        sqlx::query(link.insert_sql())
            .bind(owner_id)
            .bind(play_ids)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

async fn delete_row(db: &Database, sql: &str, id: i64, what: &str) -> Result<(), AppError> {
    let result = sqlx::query(sql).bind(id).execute(&db.pool).await?;
    if result.rows_affected() == 0 {
        return Err(AppError::not_found(what));
    }
    Ok(())
}

/* ---------- PLAYS ---------- */

async fn play_details(db: &Database, plays: Vec<Play>) -> Result<Vec<PlayDetail>, AppError> {
    let ids: Vec<i64> = plays.iter().map(|p| p.id).collect();

    let actor_links = sqlx::query_as::<_, ActorLink>(
        "SELECT ap.play_id, a.id, a.first_name, a.last_name
         FROM actor_plays ap
         JOIN actors a ON a.id = ap.actor_id
         WHERE ap.play_id = ANY($1)
         ORDER BY a.id",
    )
    .bind(&ids)
    .fetch_all(&db.pool)
    .await?;

    let genre_links = sqlx::query_as::<_, GenreLink>(
        "SELECT gp.play_id, g.id, g.name
         FROM genre_plays gp
         JOIN genres g ON g.id = gp.genre_id
         WHERE gp.play_id = ANY($1)
         ORDER BY g.id",
    )
    .bind(&ids)
    .fetch_all(&db.pool)
    .await?;

    let mut actors: HashMap<i64, Vec<String>> = HashMap::new();
    for link in actor_links {
        actors.entry(link.play_id).or_default().push(link.actor.to_string());
    }
    let mut genres: HashMap<i64, Vec<String>> = HashMap::new();
    for link in genre_links {
        genres.entry(link.play_id).or_default().push(link.genre.to_string());
    }

    Ok(plays
        .into_iter()
        .map(|play| {
            let a = actors.remove(&play.id).unwrap_or_default();
            let g = genres.remove(&play.id).unwrap_or_default();
            PlayDetail::new(play, a, g)
        })
        .collect())
}

pub async fn list_plays(db: &Database) -> Result<Vec<PlayDetail>, AppError> {
    let plays = sqlx::query_as::<_, Play>("SELECT id, title, description FROM plays ORDER BY id")
        .fetch_all(&db.pool)
        .await?;
    play_details(db, plays).await
}

pub async fn get_play(db: &Database, id: i64) -> Result<PlayDetail, AppError> {
    let play = sqlx::query_as::<_, Play>("SELECT id, title, description FROM plays WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Play"))?;

    let mut details = play_details(db, vec![play]).await?;
    details.pop().ok_or_else(|| AppError::not_found("Play"))
}

pub async fn create_play(db: &Database, payload: PlayPayload) -> Result<PlayDetail, AppError> {
    let play = sqlx::query_as::<_, Play>(
        "INSERT INTO plays (title, description) VALUES ($1, $2) RETURNING id, title, description",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .fetch_one(&db.pool)
    .await?;

    info!("Play created: {}", play);
    Ok(PlayDetail::new(play, Vec::new(), Vec::new()))
}

pub async fn update_play(db: &Database, id: i64, payload: PlayPayload) -> Result<PlayDetail, AppError> {
    let updated = sqlx::query("UPDATE plays SET title = $2, description = $3 WHERE id = $1")
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .execute(&db.pool)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::not_found("Play"));
    }
    get_play(db, id).await
}

pub async fn delete_play(db: &Database, id: i64) -> Result<(), AppError> {
    delete_row(db, "DELETE FROM plays WHERE id = $1", id, "Play").await
}

/* ---------- ACTORS ---------- */

async fn plays_by_owner(db: &Database, sql: &str, owner_ids: &[i64]) -> Result<HashMap<i64, Vec<PlayRef>>, AppError> {
    let refs = sqlx::query_as::<_, PlayRef>(sql)
        .bind(owner_ids)
        .fetch_all(&db.pool)
        .await?;

    let mut grouped: HashMap<i64, Vec<PlayRef>> = HashMap::new();
    for r in refs {
        grouped.entry(r.owner_id).or_default().push(r);
    }
    Ok(grouped)
}

const ACTOR_PLAYS_SQL: &str = "SELECT ap.actor_id AS owner_id, p.id AS play_id, p.title
     FROM actor_plays ap
     JOIN plays p ON p.id = ap.play_id
     WHERE ap.actor_id = ANY($1)
     ORDER BY p.id";

async fn actor_details(db: &Database, actors: Vec<Actor>) -> Result<Vec<ActorDetail>, AppError> {
    let ids: Vec<i64> = actors.iter().map(|a| a.id).collect();
    let mut plays = plays_by_owner(db, ACTOR_PLAYS_SQL, &ids).await?;

    Ok(actors
        .into_iter()
        .map(|actor| {
            let play_ids = plays
                .remove(&actor.id)
                .unwrap_or_default()
                .into_iter()
                .map(|r| r.play_id)
                .collect();
            ActorDetail::new(actor, play_ids)
        })
        .collect())
}

pub async fn list_actors(db: &Database) -> Result<Vec<ActorDetail>, AppError> {
    let actors = sqlx::query_as::<_, Actor>("SELECT id, first_name, last_name FROM actors ORDER BY id")
        .fetch_all(&db.pool)
        .await?;
    actor_details(db, actors).await
}

pub async fn get_actor(db: &Database, id: i64) -> Result<ActorDetail, AppError> {
    let actor = sqlx::query_as::<_, Actor>("SELECT id, first_name, last_name FROM actors WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Actor"))?;

    let mut details = actor_details(db, vec![actor]).await?;
    details.pop().ok_or_else(|| AppError::not_found("Actor"))
}

pub async fn create_actor(db: &Database, payload: ActorPayload) -> Result<ActorDetail, AppError> {
    let play_ids = payload.plays.unwrap_or_default();
    ensure_plays_exist(db, &play_ids).await?;

    let mut tx = db.pool.begin().await?;
    let actor = sqlx::query_as::<_, Actor>(
        "INSERT INTO actors (first_name, last_name) VALUES ($1, $2)
         RETURNING id, first_name, last_name",
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .fetch_one(&mut *tx)
    .await?;
    replace_links(&mut tx, PlayLink::Actor, actor.id, &play_ids).await?;
    tx.commit().await?;

    info!("Actor created: {}", actor);
    get_actor(db, actor.id).await
}

/// Omitted `plays` keeps the current associations.
pub async fn update_actor(db: &Database, id: i64, payload: ActorPayload) -> Result<ActorDetail, AppError> {
    if let Some(play_ids) = payload.plays.as_deref() {
        ensure_plays_exist(db, play_ids).await?;
    }

    let mut tx = db.pool.begin().await?;
    let updated = sqlx::query("UPDATE actors SET first_name = $2, last_name = $3 WHERE id = $1")
        .bind(id)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .execute(&mut *tx)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::not_found("Actor"));
    }
    if let Some(play_ids) = payload.plays.as_deref() {
        replace_links(&mut tx, PlayLink::Actor, id, play_ids).await?;
    }
    tx.commit().await?;

    get_actor(db, id).await
}

pub async fn delete_actor(db: &Database, id: i64) -> Result<(), AppError> {
    delete_row(db, "DELETE FROM actors WHERE id = $1", id, "Actor").await
}

/* ---------- GENRES ---------- */

const GENRE_PLAYS_SQL: &str = "SELECT gp.genre_id AS owner_id, p.id AS play_id, p.title
     FROM genre_plays gp
     JOIN plays p ON p.id = gp.play_id
     WHERE gp.genre_id = ANY($1)
     ORDER BY p.id";

async fn genre_details(db: &Database, genres: Vec<Genre>) -> Result<Vec<GenreDetail>, AppError> {
    let ids: Vec<i64> = genres.iter().map(|g| g.id).collect();
    let mut plays = plays_by_owner(db, GENRE_PLAYS_SQL, &ids).await?;

    Ok(genres
        .into_iter()
        .map(|genre| {
            let titles = plays
                .remove(&genre.id)
                .unwrap_or_default()
                .into_iter()
                .map(|r| r.title)
                .collect();
            GenreDetail::new(genre, titles)
        })
        .collect())
}

pub async fn list_genres(db: &Database) -> Result<Vec<GenreDetail>, AppError> {
    let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres ORDER BY id")
        .fetch_all(&db.pool)
        .await?;
    genre_details(db, genres).await
}

pub async fn get_genre(db: &Database, id: i64) -> Result<GenreDetail, AppError> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genres WHERE id = $1")
        .bind(id)
        .fetch_optional(&db.pool)
        .await?
        .ok_or_else(|| AppError::not_found("Genre"))?;

    let mut details = genre_details(db, vec![genre]).await?;
    details.pop().ok_or_else(|| AppError::not_found("Genre"))
}

pub async fn create_genre(db: &Database, payload: GenrePayload) -> Result<GenreDetail, AppError> {
    let play_ids = payload.plays.unwrap_or_default();
    ensure_plays_exist(db, &play_ids).await?;

    let mut tx = db.pool.begin().await?;
    let genre = sqlx::query_as::<_, Genre>("INSERT INTO genres (name) VALUES ($1) RETURNING id, name")
        .bind(&payload.name)
        .fetch_one(&mut *tx)
        .await?;
    replace_links(&mut tx, PlayLink::Genre, genre.id, &play_ids).await?;
    tx.commit().await?;

    info!("Genre created: {}", genre);
    get_genre(db, genre.id).await
}

pub async fn update_genre(db: &Database, id: i64, payload: GenrePayload) -> Result<GenreDetail, AppError> {
    if let Some(play_ids) = payload.plays.as_deref() {
        ensure_plays_exist(db, play_ids).await?;
    }

    let mut tx = db.pool.begin().await?;
    let updated = sqlx::query("UPDATE genres SET name = $2 WHERE id = $1")
        .bind(id)
        .bind(&payload.name)
        .execute(&mut *tx)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::not_found("Genre"));
    }
    if let Some(play_ids) = payload.plays.as_deref() {
        replace_links(&mut tx, PlayLink::Genre, id, play_ids).await?;
    }
    tx.commit().await?;

    get_genre(db, id).await
}

pub async fn delete_genre(db: &Database, id: i64) -> Result<(), AppError> {
    delete_row(db, "DELETE FROM genres WHERE id = $1", id, "Genre").await
}
