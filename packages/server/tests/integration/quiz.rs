use reqwest::multipart::{Form, Part};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::{Value, json};

use studia_server::entity::{quiz, quiz_answer, quiz_question, quiz_result};

use crate::common::{PDF_BYTES, TestApp, TestResponse, quiz_reply, routes};

struct QuizSetup {
    app: TestApp,
    course_id: i32,
    token: String,
}

async fn setup() -> QuizSetup {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let course_id = app.create_course(&admin, "Struktur Data").await;
    let (_, token) = app.student("Siti");
    QuizSetup {
        app,
        course_id,
        token,
    }
}

fn pdf_part(name: &str) -> Part {
    Part::bytes(PDF_BYTES.to_vec())
        .file_name(name.to_string())
        .mime_str("application/pdf")
        .unwrap()
}

impl QuizSetup {
    fn material_files(&self, names: &[&str]) -> String {
        let urls: Vec<String> = names.iter().map(|n| self.app.file_url(n)).collect();
        serde_json::to_string(&urls).unwrap()
    }

    async fn create(&self, form: Form) -> TestResponse {
        self.app
            .multipart_with_token(&routes::quizzes(self.course_id), form, &self.token)
            .await
    }

    /// Generate a quiz of `n` questions from one material file and return its ID.
    async fn generated(&self, n: usize) -> i32 {
        self.app.genai.reply("Kuis Stack");
        self.app.genai.reply(quiz_reply(n));
        let form = Form::new().text("material_files", self.material_files(&["bab1.pdf"]));
        let res = self.create(form).await;
        assert_eq!(res.status, 201, "create quiz failed: {}", res.text);
        res.data()["quiz"]["id"].as_i64().unwrap() as i32
    }

    async fn answer(&self, quiz_id: i32, number: i32, option: &str) -> TestResponse {
        self.app
            .put_with_token(
                &routes::quiz_answer(self.course_id, quiz_id, number),
                &json!({"option": option}),
                &self.token,
            )
            .await
    }

    async fn finish(&self, quiz_id: i32) -> TestResponse {
        self.app
            .post_with_token(
                &routes::quiz_finish(self.course_id, quiz_id),
                &json!({}),
                &self.token,
            )
            .await
    }

    async fn quiz_count(&self) -> u64 {
        quiz::Entity::find().count(&self.app.db).await.unwrap()
    }
}

mod create {
    use super::*;

    #[tokio::test]
    async fn quiz_is_generated_from_material_and_uploads() {
        let s = setup().await;
        s.app.genai.reply("Kuis Stack");
        s.app.genai.reply(quiz_reply(10));

        let form = Form::new()
            .text("material_files", s.material_files(&["bab1.pdf", "bab2.pdf"]))
            .part("additional_files", pdf_part("catatan.pdf"));
        let res = s.create(form).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["message"], "Quiz generated successfully");
        let data = res.data();
        assert_eq!(data["quiz"]["title"], "Kuis Stack");
        assert_eq!(data["quiz"]["question_count"], 10);
        assert_eq!(data["quiz"]["point_per_question"], 10);
        assert_eq!(data["quiz"]["attended"], false);
        assert_eq!(data["quiz"]["finished"], false);
        assert_eq!(data["questions"].as_array().unwrap().len(), 10);
        assert!(data["questions"][0]["correct_answer"].is_null());

        assert_eq!(
            s.app.genai.uploads(),
            ["material_file_0", "material_file_1", "additional_file_0"]
        );
        // Title and questions each see every file.
        let calls = s.app.genai.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][0].parts.len(), 4);
        assert_eq!(calls[1][0].parts.len(), 4);

        assert_eq!(
            quiz_question::Entity::find().count(&s.app.db).await.unwrap(),
            10
        );
    }

    #[tokio::test]
    async fn failed_file_is_skipped() {
        let s = setup().await;
        s.app.genai.fail_upload("material_file_1");
        s.app.genai.reply("Kuis");
        s.app.genai.reply(quiz_reply(3));

        let form = Form::new().text(
            "material_files",
            s.material_files(&["bab1.pdf", "bab2.pdf", "missing.pdf"]),
        );
        let res = s.create(form).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(s.app.genai.uploads(), ["material_file_0"]);
        assert_eq!(res.data()["quiz"]["question_count"], 3);
    }

    #[tokio::test]
    async fn no_usable_file_creates_nothing() {
        let s = setup().await;

        let res = s
            .create(Form::new().text("material_files", "[]"))
            .await;
        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["message"], "No valid files were processed");
        assert_eq!(
            res.body["detailError"],
            "All file uploads failed or no files were provided"
        );

        let res = s
            .create(Form::new().text("material_files", s.material_files(&["missing.pdf"])))
            .await;
        assert_eq!(res.status, 400);

        assert!(s.app.genai.calls().is_empty());
        assert_eq!(s.quiz_count().await, 0);
    }

    #[tokio::test]
    async fn material_files_field_is_required() {
        let s = setup().await;

        let res = s
            .create(Form::new().part("additional_files", pdf_part("catatan.pdf")))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Validation error");

        let res = s
            .create(Form::new().text("material_files", "not json"))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(s.quiz_count().await, 0);
    }

    #[tokio::test]
    async fn malformed_model_output_creates_nothing() {
        let s = setup().await;
        s.app.genai.reply("Kuis");
        s.app.genai.reply("Maaf, saya tidak bisa membuat kuis.");

        let res = s
            .create(Form::new().text("material_files", s.material_files(&["bab1.pdf"])))
            .await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["message"], "Error while generating quiz");
        assert_eq!(s.quiz_count().await, 0);
        assert_eq!(
            quiz_question::Entity::find().count(&s.app.db).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unreadable_upload_is_skipped() {
        let s = setup().await;
        s.app.genai.reply("Kuis");
        s.app.genai.reply(quiz_reply(2));
        let part = Part::bytes(b"hello".to_vec())
            .file_name("notes.txt")
            .mime_str("text/plain")
            .unwrap();

        let res = s
            .create(
                Form::new()
                    .text("material_files", s.material_files(&["bab1.pdf"]))
                    .part("additional_files", part),
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(s.app.genai.uploads(), ["material_file_0"]);
        assert_eq!(s.quiz_count().await, 1);
    }

    #[tokio::test]
    async fn only_unreadable_uploads_is_a_bad_request() {
        let s = setup().await;
        let part = Part::bytes(b"hello".to_vec())
            .file_name("notes.txt")
            .mime_str("text/plain")
            .unwrap();

        let res = s
            .create(
                Form::new()
                    .text("material_files", "[]")
                    .part("additional_files", part),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "No valid files were processed");
        assert_eq!(s.quiz_count().await, 0);
    }

    #[tokio::test]
    async fn html_page_behind_pdf_url_is_skipped() {
        let s = setup().await;
        s.app.genai.reply("Kuis");
        s.app.genai.reply(quiz_reply(2));

        let res = s
            .create(Form::new().text("material_files", s.material_files(&["error.pdf", "bab1.pdf"])))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(s.app.genai.uploads(), ["material_file_1"]);
    }
}

mod taking {
    use super::*;

    #[tokio::test]
    async fn finishing_scores_correct_answers() {
        let s = setup().await;
        let quiz_id = s.generated(10).await;

        // Questions 1-7 right (B), 8-9 wrong, 10 unanswered.
        for number in 1..=9 {
            let option = if number <= 7 { "B" } else { "c" };
            let res = s.answer(quiz_id, number, option).await;
            assert_eq!(res.status, 200, "{}", res.text);
            assert!(res.data()["answer"]["is_correct"].is_null());
        }

        let res = s.finish(quiz_id).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["total_point"], 70);
        assert_eq!(res.data()["correct_count"], 7);
        assert_eq!(res.data()["question_count"], 10);

        let results = quiz_result::Entity::find()
            .filter(quiz_result::Column::QuizId.eq(quiz_id))
            .all(&s.app.db)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].total_point, 70);

        let stored = quiz::Entity::find_by_id(quiz_id)
            .one(&s.app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.finished);
        assert!(stored.attended);
    }

    #[tokio::test]
    async fn perfect_score_is_points_times_questions() {
        let s = setup().await;
        let quiz_id = s.generated(10).await;

        for number in 1..=10 {
            assert_eq!(s.answer(quiz_id, number, "B").await.status, 200);
        }

        let res = s.finish(quiz_id).await;
        assert_eq!(res.data()["total_point"], 100);
    }

    #[tokio::test]
    async fn answering_again_replaces_the_answer() {
        let s = setup().await;
        let quiz_id = s.generated(3).await;

        s.answer(quiz_id, 1, "A").await;
        let res = s.answer(quiz_id, 1, "B").await;
        assert_eq!(res.status, 200);
        assert_eq!(res.data()["answer"]["option"], "B");
        assert_eq!(res.data()["answer"]["student_answer"], "B1");

        assert_eq!(quiz_answer::Entity::find().count(&s.app.db).await.unwrap(), 1);
        let result = s.finish(quiz_id).await;
        assert_eq!(result.data()["total_point"], 10);
    }

    #[tokio::test]
    async fn invalid_option_is_rejected() {
        let s = setup().await;
        let quiz_id = s.generated(3).await;

        let res = s.answer(quiz_id, 1, "E").await;

        assert_eq!(res.status, 400);
        assert_eq!(quiz_answer::Entity::find().count(&s.app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_question_is_not_found() {
        let s = setup().await;
        let quiz_id = s.generated(3).await;

        let res = s.answer(quiz_id, 4, "A").await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn finished_quiz_is_closed() {
        let s = setup().await;
        let quiz_id = s.generated(3).await;
        s.answer(quiz_id, 1, "B").await;
        assert_eq!(s.finish(quiz_id).await.status, 200);

        let res = s.answer(quiz_id, 2, "B").await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Quiz already finished");

        let res = s.finish(quiz_id).await;
        assert_eq!(res.status, 400);

        assert_eq!(quiz_result::Entity::find().count(&s.app.db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn correct_answers_are_revealed_after_finishing() {
        let s = setup().await;
        let quiz_id = s.generated(2).await;
        s.answer(quiz_id, 1, "A").await;

        let before = s
            .app
            .get_with_token(&routes::quiz(s.course_id, quiz_id), &s.token)
            .await;
        assert_eq!(before.status, 200);
        let q1: &Value = &before.data()["questions"][0];
        assert!(q1["correct_answer"].is_null());
        assert!(q1["answer"]["is_correct"].is_null());
        assert!(before.data()["quiz"]["total_point"].is_null());

        s.finish(quiz_id).await;

        let after = s
            .app
            .get_with_token(&routes::quiz(s.course_id, quiz_id), &s.token)
            .await;
        let q1 = &after.data()["questions"][0];
        assert_eq!(q1["correct_answer"], "B1");
        assert_eq!(q1["answer"]["is_correct"], false);
        assert_eq!(after.data()["quiz"]["total_point"], 0);
        assert_eq!(after.data()["quiz"]["finished"], true);
    }

    #[tokio::test]
    async fn opening_a_question_marks_the_quiz_attended() {
        let s = setup().await;
        let quiz_id = s.generated(2).await;

        let res = s
            .app
            .get_with_token(&routes::quiz_question(s.course_id, quiz_id, 2), &s.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["number"], 2);
        assert_eq!(res.data()["question"], "Pertanyaan 2?");
        assert!(res.data()["correct_answer"].is_null());

        let stored = quiz::Entity::find_by_id(quiz_id)
            .one(&s.app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.attended);
    }

    #[tokio::test]
    async fn attend_marks_the_quiz_attended() {
        let s = setup().await;
        let quiz_id = s.generated(2).await;

        let res = s
            .app
            .post_with_token(&routes::quiz_attend(s.course_id, quiz_id), &json!({}), &s.token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["attended"], true);
    }
}

mod manage {
    use super::*;

    #[tokio::test]
    async fn list_shows_only_own_quizzes_with_scores() {
        let s = setup().await;
        let first = s.generated(1).await;
        s.generated(1).await;
        s.answer(first, 1, "B").await;
        s.finish(first).await;

        let (_, other) = s.app.student("Budi");
        let res = s.app.get_with_token(&routes::quizzes(s.course_id), &other).await;
        assert_eq!(res.status, 200);
        assert!(res.data().as_array().unwrap().is_empty());

        let res = s.app.get_with_token(&routes::quizzes(s.course_id), &s.token).await;
        let quizzes = res.data().as_array().unwrap();
        assert_eq!(quizzes.len(), 2);
        let scored = quizzes
            .iter()
            .find(|q| q["id"] == first)
            .expect("first quiz should be listed");
        assert_eq!(scored["total_point"], 10);
    }

    #[tokio::test]
    async fn delete_removes_quiz_and_its_rows() {
        let s = setup().await;
        let quiz_id = s.generated(3).await;
        s.answer(quiz_id, 1, "B").await;
        s.finish(quiz_id).await;

        let res = s
            .app
            .delete_with_token(&routes::quiz(s.course_id, quiz_id), &s.token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Quiz deleted");

        assert_eq!(s.quiz_count().await, 0);
        assert_eq!(quiz_question::Entity::find().count(&s.app.db).await.unwrap(), 0);
        assert_eq!(quiz_answer::Entity::find().count(&s.app.db).await.unwrap(), 0);
        assert_eq!(quiz_result::Entity::find().count(&s.app.db).await.unwrap(), 0);

        let res = s
            .app
            .get_with_token(&routes::quiz(s.course_id, quiz_id), &s.token)
            .await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn other_students_cannot_see_a_quiz() {
        let s = setup().await;
        let quiz_id = s.generated(1).await;
        let (_, other) = s.app.student("Budi");

        let res = s
            .app
            .get_with_token(&routes::quiz(s.course_id, quiz_id), &other)
            .await;

        assert_eq!(res.status, 404);
    }
}
