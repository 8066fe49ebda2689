use serde_json::json;

use crate::common::{TestApp, routes};

mod catalogue {
    use super::*;

    #[tokio::test]
    async fn admin_can_create_and_read_a_course() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let id = app.create_course(&admin, "Struktur Data").await;

        let (_, student) = app.student("Siti");
        let res = app.get_with_token(&routes::course(id), &student).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["name"], "Struktur Data");
        assert_eq!(res.data()["time_start"], "08:00");
        assert_eq!(res.data()["student_count"], 30);
    }

    #[tokio::test]
    async fn courses_are_listed_newest_first() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_course(&admin, "Basis Data").await;
        app.create_course(&admin, "Jaringan Komputer").await;

        let res = app.get_with_token(routes::COURSES, &admin).await;

        assert_eq!(res.status, 200);
        let names: Vec<&str> = res.data()
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Jaringan Komputer", "Basis Data"]);
    }

    #[tokio::test]
    async fn students_cannot_create_courses() {
        let app = TestApp::spawn().await;
        let (_, student) = app.student("Siti");

        let res = app
            .post_with_token(
                routes::COURSES,
                &json!({
                    "name": "Kalkulus",
                    "program": "Matematika",
                    "instructor": "Ani",
                    "weeks": "1-14",
                    "time_start": "08:00",
                    "time_end": "10:00",
                    "student_count": 20,
                }),
                &student,
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn invalid_course_times_are_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::COURSES,
                &json!({
                    "name": "Kalkulus",
                    "program": "Matematika",
                    "instructor": "Ani",
                    "weeks": "1-14",
                    "time_start": "10:00",
                    "time_end": "08:00",
                    "student_count": 20,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["message"], "Validation error");
        assert!(res.body["detailError"].is_string());
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let app = TestApp::spawn().await;
        let (_, student) = app.student("Siti");

        let res = app.get_with_token(&routes::course(999), &student).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["message"], "Course not found");
    }
}

mod materials {
    use super::*;

    #[tokio::test]
    async fn material_is_returned_with_its_files() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let course_id = app.create_course(&admin, "Struktur Data").await;

        let material = app
            .create_material(&admin, course_id, &["bab1.pdf", "bab2.pdf"])
            .await;
        let material_id = material["id"].as_i64().unwrap() as i32;

        let res = app
            .get_with_token(&routes::material(course_id, material_id), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["files"].as_array().unwrap().len(), 2);
        assert_eq!(res.data()["files"][0]["file_name"], "bab1.pdf");

        let list = app.get_with_token(&routes::materials(course_id), &admin).await;
        assert_eq!(list.status, 200);
        assert_eq!(list.data().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn material_of_another_course_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let first = app.create_course(&admin, "Struktur Data").await;
        let second = app.create_course(&admin, "Basis Data").await;
        let material = app.create_material(&admin, first, &["bab1.pdf"]).await;
        let material_id = material["id"].as_i64().unwrap() as i32;

        let res = app
            .get_with_token(&routes::material(second, material_id), &admin)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn recent_materials_include_course_name() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let course_id = app.create_course(&admin, "Struktur Data").await;
        app.create_material(&admin, course_id, &["bab1.pdf"]).await;

        let (_, student) = app.student("Siti");
        let res = app.get_with_token(routes::RECENT_MATERIALS, &student).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()[0]["course_name"], "Struktur Data");
        assert_eq!(res.data()[0]["course_id"], course_id);
    }

    #[tokio::test]
    async fn material_file_url_must_be_http() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let course_id = app.create_course(&admin, "Struktur Data").await;

        let res = app
            .post_with_token(
                &routes::materials(course_id),
                &json!({
                    "name": "Pertemuan 1",
                    "files": [{"file_name": "a.pdf", "file_path": "a.pdf", "file_url": "ftp://x/a.pdf"}],
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
    }
}
