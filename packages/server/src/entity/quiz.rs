use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quiz")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub course_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    pub student_id: Uuid,

    pub title: String,
    pub question_count: i32,
    pub point_per_question: i32,

    /// Set when the student first opens a question.
    #[sea_orm(default_value = false)]
    pub attended: bool,
    #[sea_orm(default_value = false)]
    pub finished: bool,

    #[sea_orm(has_many)]
    pub questions: HasMany<super::quiz_question::Entity>,

    #[sea_orm(has_one)]
    pub result: HasOne<super::quiz_result::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
