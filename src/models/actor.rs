use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorDetail {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub plays: Vec<i64>,
}

impl ActorDetail {
    pub fn new(actor: Actor, plays: Vec<i64>) -> Self {
        Self {
            id: actor.id,
            first_name: actor.first_name,
            last_name: actor.last_name,
            plays,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ActorPayload {
    #[validate(length(min = 1, max = 255, message = "First name must be between 1 and 255 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255, message = "Last name must be between 1 and 255 characters."))]
    pub last_name: String,
    #[serde(default)]
    pub plays: Option<Vec<i64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_full_name() {
        let actor = Actor { id: 1, first_name: "John".into(), last_name: "Doe".into() };
        assert_eq!(actor.to_string(), "John Doe");
    }
}
