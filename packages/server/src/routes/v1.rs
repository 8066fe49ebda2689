use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{self, auth, course, discussion, quiz, simplify};
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/courses", course_routes(config))
        .nest("/materials", recent_material_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(auth::me))
}

fn recent_material_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(course::list_recent_materials))
}

fn course_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(course::list_courses, course::create_course))
        .routes(routes!(course::get_course))
        .nest("/{course_id}/materials", material_routes(config))
        .nest("/{course_id}/discussion", discussion_routes())
        .nest("/{course_id}/quiz", quiz_routes(config))
}

fn material_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let simplify = OpenApiRouter::new()
        .routes(routes!(
            simplify::list_simplify_materials,
            simplify::create_simplify_material
        ))
        .layer(handlers::upload_body_limit(config.upload.max_file_size));

    OpenApiRouter::new()
        .routes(routes!(course::list_materials, course::create_material))
        .routes(routes!(course::get_material))
        .nest("/{material_id}/simplify_materials", simplify)
}

fn discussion_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            discussion::list_discussion,
            discussion::create_discussion
        ))
        .routes(routes!(discussion::regenerate_discussion))
}

fn quiz_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let create = OpenApiRouter::new()
        .routes(routes!(quiz::list_quizzes, quiz::create_quiz))
        .layer(handlers::upload_body_limit(config.upload.max_file_size));

    create
        .routes(routes!(quiz::get_quiz, quiz::delete_quiz))
        .routes(routes!(quiz::attend_quiz))
        .routes(routes!(quiz::get_question))
        .routes(routes!(quiz::answer_question))
        .routes(routes!(quiz::finish_quiz))
}
