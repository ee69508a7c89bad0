use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self { id: user.id, username: user.username, email: user.email }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters."))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(must_match(other = "password2", message = "Passwords should match"))]
    pub password: String,
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub access: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::{FreeEmail, Username};
    use fake::Fake;

    fn payload(password: &str, password2: &str) -> RegisterPayload {
        RegisterPayload {
            username: Username().fake(),
            email: FreeEmail().fake(),
            password: password.into(),
            password2: password2.into(),
        }
    }

    #[test]
    fn matching_passwords_pass() {
        assert!(payload("UserPass123!", "UserPass123!").validate().is_ok());
    }

    #[test]
    fn short_matching_password_passes() {
        assert!(payload("abc", "abc").validate().is_ok());
    }

    #[test]
    fn mismatched_passwords_are_reported_on_password() {
        let errors = payload("UserPass123!", "Different123!").validate().unwrap_err();
        let fields = errors.field_errors();
        let messages: Vec<String> = fields["password"]
            .iter()
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .collect();
        assert!(messages.contains(&"Passwords should match".to_string()));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            username: "testuser".into(),
            email: "testuser@example.com".into(),
            password_hash: "$2b$12$secret".into(),
            is_staff: false,
            is_active: true,
            date_joined: Utc::now(),
        };
        let body = serde_json::to_value(&user).unwrap();
        assert!(body.get("password_hash").is_none());
        assert_eq!(UserSummary::from(user).username, "testuser");
    }
}
