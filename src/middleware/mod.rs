use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use std::sync::Arc;

use crate::{error::AppError, services::auth::TokenType, AppState};

/// Authenticated principal resolved from a Bearer access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub is_staff: bool,
}

impl AuthUser {
    /// Owner-or-admin check for per-principal resources.
    pub fn can_access(&self, owner_id: i64) -> bool {
        self.is_staff || self.user_id == owner_id
    }

    /// `None` for admins (no restriction), otherwise the principal's own id.
    pub fn owner_scope(&self) -> Option<i64> {
        if self.is_staff {
            None
        } else {
            Some(self.user_id)
        }
    }
}

/// Principal with the admin role flag set.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

// Bearer JWT extractor
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let claims = state.tokens.verify(token.trim(), TokenType::Access)?;

        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.username,
            is_staff: claims.is_staff,
        })
    }
}

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff {
            tracing::debug!("Admin-only route refused for user {}", user.user_id);
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
