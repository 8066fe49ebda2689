use sea_orm::sea_query::{Index, IndexCreateStatement, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{discussion, quiz, simplify_material};

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Conversation replay:
    // SELECT * FROM discussion WHERE course_id = ? AND student_id = ? ORDER BY created_at, id
    ensure_index(
        db,
        "idx_discussion_course_student_created",
        Index::create()
            .table(discussion::Entity)
            .col(discussion::Column::CourseId)
            .col(discussion::Column::StudentId)
            .col(discussion::Column::CreatedAt)
            .to_owned(),
    )
    .await;

    // Quiz list of a student in a course, newest first
    ensure_index(
        db,
        "idx_quiz_course_student_created",
        Index::create()
            .table(quiz::Entity)
            .col(quiz::Column::CourseId)
            .col(quiz::Column::StudentId)
            .col(quiz::Column::CreatedAt)
            .to_owned(),
    )
    .await;

    ensure_index(
        db,
        "idx_simplify_material_material_student",
        Index::create()
            .table(simplify_material::Entity)
            .col(simplify_material::Column::MaterialId)
            .col(simplify_material::Column::StudentId)
            .to_owned(),
    )
    .await;

    Ok(())
}

async fn ensure_index(db: &DatabaseConnection, name: &str, mut stmt: IndexCreateStatement) {
    let sql = stmt
        .if_not_exists()
        .name(name)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&sql).await {
        Ok(_) => info!("Ensured index {} exists", name),
        Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
    }
}
