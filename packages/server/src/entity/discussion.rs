use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One chat turn. Regenerating or editing overwrites the row in place.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "discussion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    pub student_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub prompt: String,
    #[sea_orm(column_type = "Text")]
    pub answer: String, // in Markdown

    #[sea_orm(has_many)]
    pub files: HasMany<super::discussion_file::Entity>,

    #[sea_orm(has_many)]
    pub additional_files: HasMany<super::additional_discussion_file::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
