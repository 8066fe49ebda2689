use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub program: String,
    pub instructor: String,
    pub weeks: String,
    pub time_start: String, // "08:00"
    pub time_end: String,
    pub student_count: i32,

    #[sea_orm(has_many)]
    pub materials: HasMany<super::material::Entity>,

    #[sea_orm(has_many)]
    pub discussions: HasMany<super::discussion::Entity>,

    #[sea_orm(has_many)]
    pub quizzes: HasMany<super::quiz::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
