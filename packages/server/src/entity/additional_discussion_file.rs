use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// File the student uploaded themselves for a discussion turn.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "additional_discussion_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub discussion_id: i32,
    #[sea_orm(belongs_to, from = "discussion_id", to = "id")]
    pub discussion: HasOne<super::discussion::Entity>,

    pub file_name: String,
    pub file_type: String, // always "pdf" for now
    #[sea_orm(column_type = "Text")]
    pub file_path: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
