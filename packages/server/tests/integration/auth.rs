use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

use studia_server::entity::app_user;
use studia_server::utils::jwt;

use crate::common::{JWT_SECRET, TestApp, routes};

mod me {
    use super::*;

    #[tokio::test]
    async fn first_call_provisions_a_student_profile() {
        let app = TestApp::spawn().await;
        let (id, token) = app.student("Siti Rahma");

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["id"], id.to_string());
        assert_eq!(res.data()["name"], "Siti Rahma");
        assert_eq!(res.data()["email"], "siti.rahma@example.com");
        assert_eq!(res.data()["role"], "student");

        let stored = app_user::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .expect("profile should be stored");
        assert_eq!(stored.role, app_user::DEFAULT_ROLE);
    }

    #[tokio::test]
    async fn repeated_calls_keep_the_role() {
        let app = TestApp::spawn().await;
        let (id, token) = app.student("Budi");

        let first = app.get_with_token(routes::ME, &token).await;
        assert_eq!(first.status, 200, "{}", first.text);

        let stored = app_user::Entity::find_by_id(id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: app_user::ActiveModel = stored.into();
        active.role = Set(app_user::ADMIN_ROLE.into());
        active.update(&app.db).await.unwrap();

        let second = app.get_with_token(routes::ME, &token).await;
        assert_eq!(second.status, 200);
        assert_eq!(second.data()["role"], "admin");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["message"], "Authentication required");
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let app = TestApp::spawn().await;
        let token = jwt::sign(uuid::Uuid::new_v4(), None, None, None, "another-secret").unwrap();

        let res = app.get_with_token(routes::COURSES, &token).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["message"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn non_bearer_header_is_rejected() {
        let app = TestApp::spawn().await;
        let token = jwt::sign(uuid::Uuid::new_v4(), None, None, None, JWT_SECRET).unwrap();

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::ME))
            .header("Authorization", format!("Token {token}"))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn every_feature_route_requires_a_token() {
        let app = TestApp::spawn().await;

        for path in [
            routes::COURSES.to_string(),
            routes::RECENT_MATERIALS.to_string(),
            routes::discussion(1),
            routes::quizzes(1),
        ] {
            let res = app.get_without_token(&path).await;
            assert_eq!(res.status, 401, "GET {path} should need a token");
        }

        let res = app
            .post_without_token(&routes::discussion(1), &json!({"prompt": "Halo"}))
            .await;
        assert_eq!(res.status, 401);
    }
}
