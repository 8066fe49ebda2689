use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::entity::simplify_material;

#[derive(Serialize, utoipa::ToSchema)]
pub struct SimplifyMaterialResponse {
    pub id: i32,
    pub material_id: i32,
    pub student_id: Uuid,
    #[schema(example = "Memahami Linked List dengan Mudah")]
    pub title: String,
    /// Explanation in Markdown.
    pub simplified_content: String,
    pub created_at: DateTime<Utc>,
}

impl From<simplify_material::Model> for SimplifyMaterialResponse {
    fn from(s: simplify_material::Model) -> Self {
        Self {
            id: s.id,
            material_id: s.material_id,
            student_id: s.student_id,
            title: s.title,
            simplified_content: s.simplified_content,
            created_at: s.created_at,
        }
    }
}
