use genai::Part as ContentPart;
use reqwest::multipart::{Form, Part};
use sea_orm::{EntityTrait, PaginatorTrait};

use studia_server::entity::simplify_material;

use crate::common::{PDF_BYTES, TestApp, routes};

struct Setup {
    app: TestApp,
    course_id: i32,
    material_id: i32,
    token: String,
}

async fn setup() -> Setup {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let course_id = app.create_course(&admin, "Struktur Data").await;
    let material = app.create_material(&admin, course_id, &["bab1.pdf"]).await;
    let material_id = material["id"].as_i64().unwrap() as i32;
    let (_, token) = app.student("Siti");
    Setup {
        app,
        course_id,
        material_id,
        token,
    }
}

fn pdf_part(name: &str) -> Part {
    Part::bytes(PDF_BYTES.to_vec())
        .file_name(name.to_string())
        .mime_str("application/pdf")
        .unwrap()
}

fn text_of(part: &ContentPart) -> &str {
    match part {
        ContentPart::Text { text } => text,
        other => panic!("expected text part, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_and_url_are_summarised_then_condensed() {
    let s = setup().await;
    s.app.genai.reply("Ringkasan catatan");
    s.app.genai.reply("Ringkasan bab 1");
    s.app.genai.reply("Penjelasan sederhana");
    s.app.genai.reply("Stack dalam Sekejap");

    let form = Form::new()
        .part("files", pdf_part("catatan.pdf"))
        .text("urls", s.app.file_url("bab1.pdf"));
    let res = s
        .app
        .multipart_with_token(
            &routes::simplify_materials(s.course_id, s.material_id),
            form,
            &s.token,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["message"], "Material simplified");
    assert_eq!(res.data()["title"], "Stack dalam Sekejap");
    assert_eq!(res.data()["simplified_content"], "Penjelasan sederhana");
    assert_eq!(res.data()["material_id"], s.material_id);

    assert_eq!(s.app.genai.uploads(), ["simplify_file_0", "simplify_file_1"]);
    let calls = s.app.genai.calls();
    assert_eq!(calls.len(), 4);
    let condense = text_of(&calls[2][0].parts[0]);
    assert!(condense.contains("Ringkasan catatan"));
    assert!(condense.contains("Ringkasan bab 1"));
    assert!(text_of(&calls[3][0].parts[0]).contains("Penjelasan sederhana"));

    let list = s
        .app
        .get_with_token(
            &routes::simplify_materials(s.course_id, s.material_id),
            &s.token,
        )
        .await;
    assert_eq!(list.status, 200);
    assert_eq!(list.data().as_array().unwrap().len(), 1);

    let (_, other) = s.app.student("Budi");
    let list = s
        .app
        .get_with_token(
            &routes::simplify_materials(s.course_id, s.material_id),
            &other,
        )
        .await;
    assert!(list.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn at_least_one_source_is_required() {
    let s = setup().await;

    let res = s
        .app
        .multipart_with_token(
            &routes::simplify_materials(s.course_id, s.material_id),
            Form::new().text("note", "kosong"),
            &s.token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["message"], "Validation error");
    assert!(s.app.genai.calls().is_empty());
}

#[tokio::test]
async fn non_pdf_upload_is_rejected() {
    let s = setup().await;
    let part = Part::bytes(b"plain notes".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();

    let res = s
        .app
        .multipart_with_token(
            &routes::simplify_materials(s.course_id, s.material_id),
            Form::new().part("files", part),
            &s.token,
        )
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(
        simplify_material::Entity::find().count(&s.app.db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn model_failure_stores_nothing() {
    let s = setup().await;
    s.app.genai.reply("Ringkasan");
    s.app.genai.fail_next(genai::GenAiError::EmptyResponse);

    let res = s
        .app
        .multipart_with_token(
            &routes::simplify_materials(s.course_id, s.material_id),
            Form::new().text("urls", s.app.file_url("bab1.pdf")),
            &s.token,
        )
        .await;

    assert_eq!(res.status, 500);
    assert_eq!(
        simplify_material::Entity::find().count(&s.app.db).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn unknown_material_is_not_found() {
    let s = setup().await;

    let res = s
        .app
        .multipart_with_token(
            &routes::simplify_materials(s.course_id, s.material_id + 100),
            Form::new().text("urls", s.app.file_url("bab1.pdf")),
            &s.token,
        )
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn html_page_behind_pdf_url_is_rejected() {
    let s = setup().await;

    let res = s
        .app
        .multipart_with_token(
            &routes::simplify_materials(s.course_id, s.material_id),
            Form::new().text("urls", s.app.file_url("error.pdf")),
            &s.token,
        )
        .await;

    assert_eq!(res.status, 400, "{}", res.text);
    assert!(s.app.genai.uploads().is_empty());
    assert!(s.app.genai.calls().is_empty());
}
