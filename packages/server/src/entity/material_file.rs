use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "material_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub material_id: i32,
    #[sea_orm(belongs_to, from = "material_id", to = "id")]
    pub material: HasOne<super::material::Entity>,

    pub file_name: String,
    /// Path inside the object store bucket.
    pub file_path: String,
    /// Public URL the PDF can be downloaded from.
    #[sea_orm(column_type = "Text")]
    pub file_url: String,

    #[sea_orm(has_many)]
    pub discussion_files: HasMany<super::discussion_file::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
