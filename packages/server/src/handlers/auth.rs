use axum::Json;
use axum::extract::State;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, Set};
use tracing::instrument;

use crate::entity::app_user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::ApiResponse;
use crate::models::auth::ProfileResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get current user profile",
    description = "Verifies the bearer token and returns the caller's profile. The profile is created \
        from the token claims on first sight; later calls refresh its name and email.",
    responses(
        (status = 200, description = "Current user profile", body = ApiResponse<ProfileResponse>),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProfileResponse>>, AppError> {
    let profile = ensure_profile(&state.db, &auth_user).await?;
    Ok(Json(ApiResponse::new("Success get user", profile.into())))
}

/// Upsert the local profile of `auth_user`. The stored role is never changed here.
pub async fn ensure_profile<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
) -> Result<app_user::Model, AppError> {
    let profile = app_user::ActiveModel {
        id: Set(auth_user.user_id),
        name: Set(auth_user.display_name()),
        email: Set(auth_user.email.clone()),
        role: Set(app_user::DEFAULT_ROLE.to_string()),
        created_at: Set(Utc::now()),
    };

    app_user::Entity::insert(profile)
        .on_conflict(
            OnConflict::column(app_user::Column::Id)
                .update_columns([app_user::Column::Name, app_user::Column::Email])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    app_user::Entity::find_by_id(auth_user.user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("app_user missing after upsert".into()))
}
