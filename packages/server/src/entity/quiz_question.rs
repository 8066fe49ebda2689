use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz_question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "quiz_number")]
    pub quiz_id: i32,
    #[sea_orm(belongs_to, from = "quiz_id", to = "id")]
    pub quiz: HasOne<super::quiz::Entity>,

    /// 1-based position within the quiz.
    #[sea_orm(unique_key = "quiz_number")]
    pub number: i32,

    #[sea_orm(column_type = "Text")]
    pub question: String,
    #[sea_orm(column_type = "Text")]
    pub option_a: String,
    #[sea_orm(column_type = "Text")]
    pub option_b: String,
    #[sea_orm(column_type = "Text")]
    pub option_c: String,
    #[sea_orm(column_type = "Text")]
    pub option_d: String,
    /// Text of the right option, not its letter.
    #[sea_orm(column_type = "Text")]
    pub correct_answer: String,

    #[sea_orm(has_one)]
    pub answer: HasOne<super::quiz_answer::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
