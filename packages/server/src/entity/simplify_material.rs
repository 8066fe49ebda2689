use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// AI-written explanation of one or more material files. Append-only.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "simplify_material")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub material_id: i32,
    #[sea_orm(belongs_to, from = "material_id", to = "id")]
    pub material: HasOne<super::material::Entity>,

    #[sea_orm(indexed)]
    pub student_id: Uuid,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub simplified_content: String, // in Markdown

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
