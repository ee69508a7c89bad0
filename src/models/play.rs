use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Play {
    pub id: i64,
    pub title: String,
    pub description: String,
}

impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Play with the display names of its actors and genres.
#[derive(Debug, Clone, Serialize)]
pub struct PlayDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub actors: Vec<String>,
    pub genres: Vec<String>,
}

impl PlayDetail {
    pub fn new(play: Play, actors: Vec<String>, genres: Vec<String>) -> Self {
        Self {
            id: play.id,
            title: play.title,
            description: play.description,
            actors,
            genres,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PlayPayload {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters."))]
    pub title: String,
    pub description: String,
}
