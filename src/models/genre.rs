use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// plays - названия пьес, а не id
#[derive(Debug, Clone, Serialize)]
pub struct GenreDetail {
    pub id: i64,
    pub name: String,
    pub plays: Vec<String>,
}

impl GenreDetail {
    pub fn new(genre: Genre, plays: Vec<String>) -> Self {
        Self { id: genre.id, name: genre.name, plays }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenrePayload {
    #[validate(length(min = 1, max = 255, message = "Name must be between 1 and 255 characters."))]
    pub name: String,
    #[serde(default)]
    pub plays: Option<Vec<i64>>,
}
