//! auth.rs
//!
//! Учетные записи и токены:
//! - регистрация пользователя (bcrypt в отдельном blocking-потоке);
//! - выдача пары access/refresh JWT и обновление access по refresh;
//! - создание администратора при старте, если он задан в конфигурации.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    config::{AdminConfig, JwtConfig},
    database::Database,
    error::{AppError, FieldErrors},
    models::{AccessToken, RegisterPayload, TokenPair, TokenRequest, User, UserSummary},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT payload. The role flag travels in the token so that request
/// authentication needs no database round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub is_staff: bool,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: Uuid,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::hours(config.refresh_ttl_hours),
        }
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.issue(user.id, &user.username, user.is_staff, TokenType::Access)?,
            refresh: self.issue(user.id, &user.username, user.is_staff, TokenType::Refresh)?,
        })
    }

    pub fn issue(
        &self,
        user_id: i64,
        username: &str,
        is_staff: bool,
        token_type: TokenType,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            is_staff,
            token_type,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Decodes and checks signature, expiry and token type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized)?;

        if data.claims.token_type != expected {
            return Err(AppError::Unauthorized);
        }
        Ok(data.claims)
    }

    pub fn refresh(&self, refresh_token: &str) -> Result<AccessToken, AppError> {
        let claims = self.verify(refresh_token, TokenType::Refresh)?;
        let access = self.issue(claims.sub, &claims.username, claims.is_staff, TokenType::Access)?;
        Ok(AccessToken { access })
    }
}

pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {}", e))?
        .map_err(AppError::from)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| anyhow::anyhow!("password verification task failed: {}", e))?
        .map_err(AppError::from)
}

pub async fn find_by_username(db: &Database, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, is_staff, is_active, date_joined
         FROM users
         WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(&db.pool)
    .await
}

async fn insert_user(
    db: &Database,
    username: &str,
    email: &str,
    password_hash: &str,
    is_staff: bool,
) -> Result<UserSummary, AppError> {
    sqlx::query_as::<_, UserSummary>(
        "INSERT INTO users (username, email, password_hash, is_staff)
         VALUES ($1, $2, $3, $4)
         RETURNING id, username, email",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(is_staff)
    .fetch_one(&db.pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::Validation(FieldErrors::single(
                    "username",
                    "A user with that username already exists.",
                ));
            }
        }
        e.into()
    })
}

pub async fn register(
    db: &Database,
    bcrypt_cost: u32,
    payload: RegisterPayload,
) -> Result<UserSummary, AppError> {
    let password_hash = hash_password(&payload.password, bcrypt_cost).await?;
    let user = insert_user(db, &payload.username, &payload.email, &password_hash, false).await?;
    info!("Registered user {} (id={})", user.username, user.id);
    Ok(user)
}

pub async fn obtain_token_pair(
    db: &Database,
    tokens: &TokenService,
    request: TokenRequest,
) -> Result<TokenPair, AppError> {
    let user = find_by_username(db, &request.username)
        .await?
        .filter(|u| u.is_active)
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&request.password, &user.password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    tokens.issue_pair(&user)
}

/// Creates the configured administrator unless a user with that name exists.
pub async fn ensure_admin(db: &Database, admin: &AdminConfig, bcrypt_cost: u32) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (admin.username.as_deref(), admin.password.as_deref()) else {
        return Ok(());
    };

    if find_by_username(db, username).await?.is_some() {
        return Ok(());
    }

    let email = admin.email.as_deref().unwrap_or_default();
    let password_hash = hash_password(password, bcrypt_cost).await?;
    insert_user(db, username, email, &password_hash, true).await?;
    info!("Created administrator account {}", username);
    Ok(())
}
