use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course material file attached to a discussion turn.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "discussion_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub discussion_id: i32,
    #[sea_orm(belongs_to, from = "discussion_id", to = "id")]
    pub discussion: HasOne<super::discussion::Entity>,

    pub material_file_id: i32,
    #[sea_orm(belongs_to, from = "material_file_id", to = "id")]
    pub material_file: HasOne<super::material_file::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
