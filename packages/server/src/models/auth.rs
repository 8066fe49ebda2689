use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::app_user;

/// Profile of the authenticated user.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    /// Identity provider user ID.
    pub id: Uuid,
    #[schema(example = "Siti Rahma")]
    pub name: String,
    #[schema(example = "siti@example.com")]
    pub email: Option<String>,
    /// `student` or `admin`.
    #[schema(example = "student")]
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<app_user::Model> for ProfileResponse {
    fn from(user: app_user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
