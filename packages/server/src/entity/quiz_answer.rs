use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_answer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// One answer per question; re-answering upserts on this key.
    #[sea_orm(unique)]
    pub qq_id: i32,
    #[sea_orm(belongs_to, from = "qq_id", to = "id")]
    pub question: HasOne<super::quiz_question::Entity>,

    pub student_id: Uuid,

    #[sea_orm(column_name = "option")]
    pub chosen_option: String, // "A".."D"
    #[sea_orm(column_type = "Text")]
    pub student_answer: String,
    pub is_correct: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
