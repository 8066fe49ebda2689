use axum::{extract::FromRequestParts, http::request::Parts};
use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::entity::app_user;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl AuthUser {
    /// Name to show for this user: full name, then email, then a fallback.
    pub fn display_name(&self) -> String {
        self.full_name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Student".to_string())
    }

    /// Returns the caller's profile if it carries the admin role.
    pub async fn require_admin<C: ConnectionTrait>(
        &self,
        db: &C,
    ) -> Result<app_user::Model, AppError> {
        let profile = app_user::Entity::find_by_id(self.user_id)
            .one(db)
            .await?
            .ok_or(AppError::Forbidden)?;

        if profile.role == app_user::ADMIN_ROLE {
            Ok(profile)
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let auth = &state.config.auth;
        let claims = jwt::verify(token, &auth.jwt_secret, auth.audience.as_deref())
            .map_err(|e| {
                tracing::debug!("Rejected token: {e}");
                AppError::TokenInvalid
            })?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            full_name: claims.user_metadata.full_name,
        })
    }
}
