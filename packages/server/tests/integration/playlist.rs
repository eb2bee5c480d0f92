use serde_json::json;

use crate::common::{TestApp, routes};

async fn setup() -> (TestApp, String, i32, i32) {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let first = app.create_problem(&admin, "Add Two Numbers").await;
    let second = app.create_problem(&admin, "Add Two More Numbers").await;
    let token = app.create_authenticated_user("alice@example.com").await;
    (app, token, first, second)
}

async fn create_playlist(app: &TestApp, token: &str, name: &str) -> i32 {
    let res = app
        .post_with_token(
            routes::PLAYLISTS,
            &json!({"name": name, "description": "practice"}),
            token,
        )
        .await;
    assert_eq!(res.status, 201, "create_playlist failed: {}", res.text);
    res.id()
}

mod crud {
    use super::*;

    #[tokio::test]
    async fn create_and_list_playlists() {
        let (app, token, _, _) = setup().await;
        let id = create_playlist(&app, &token, "Warm-up").await;

        let res = app.get_with_token(routes::PLAYLISTS, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let lists = res.body.as_array().unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0]["id"], id);
        assert_eq!(lists[0]["name"], "Warm-up");
        assert_eq!(lists[0]["problems"], json!([]));
    }

    #[tokio::test]
    async fn duplicate_name_for_the_same_owner_conflicts() {
        let (app, token, _, _) = setup().await;
        create_playlist(&app, &token, "Warm-up").await;

        let res = app
            .post_with_token(routes::PLAYLISTS, &json!({"name": "Warm-up"}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");

        let bob = app.create_authenticated_user("bob@example.com").await;
        create_playlist(&app, &bob, "Warm-up").await;
    }

    #[tokio::test]
    async fn other_users_cannot_see_or_delete_it() {
        let (app, token, _, _) = setup().await;
        let id = create_playlist(&app, &token, "Warm-up").await;
        let bob = app.create_authenticated_user("bob@example.com").await;

        assert_eq!(app.get_with_token(&routes::playlist(id), &bob).await.status, 404);
        assert_eq!(app.delete_with_token(&routes::playlist(id), &bob).await.status, 404);
        assert_eq!(app.get_with_token(&routes::playlist(id), &token).await.status, 200);
    }

    #[tokio::test]
    async fn owner_can_delete_it() {
        let (app, token, first, _) = setup().await;
        let id = create_playlist(&app, &token, "Warm-up").await;
        app.post_with_token(
            &routes::playlist_problems(id),
            &json!({"problem_ids": [first]}),
            &token,
        )
        .await;

        let res = app.delete_with_token(&routes::playlist(id), &token).await;
        assert_eq!(res.status, 204, "{}", res.text);

        assert_eq!(app.get_with_token(&routes::playlist(id), &token).await.status, 404);
    }
}

mod problems {
    use super::*;

    #[tokio::test]
    async fn add_is_idempotent_and_remove_detaches() {
        let (app, token, first, second) = setup().await;
        let id = create_playlist(&app, &token, "Warm-up").await;

        let added = app
            .post_with_token(
                &routes::playlist_problems(id),
                &json!({"problem_ids": [first, second]}),
                &token,
            )
            .await;
        assert_eq!(added.status, 200, "{}", added.text);
        assert_eq!(added.body["affected"], 2);

        let again = app
            .post_with_token(
                &routes::playlist_problems(id),
                &json!({"problem_ids": [first]}),
                &token,
            )
            .await;
        assert_eq!(again.status, 200, "{}", again.text);
        assert_eq!(again.body["affected"], 0);

        let detail = app.get_with_token(&routes::playlist(id), &token).await;
        assert_eq!(detail.body["problems"].as_array().unwrap().len(), 2);

        let removed = app
            .delete_json_with_token(
                &routes::playlist_problems(id),
                &json!({"problem_ids": [first]}),
                &token,
            )
            .await;
        assert_eq!(removed.status, 200, "{}", removed.text);
        assert_eq!(removed.body["affected"], 1);

        let detail = app.get_with_token(&routes::playlist(id), &token).await;
        let problems = detail.body["problems"].as_array().unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0]["id"], second);
    }

    #[tokio::test]
    async fn unknown_problem_is_not_found() {
        let (app, token, first, _) = setup().await;
        let id = create_playlist(&app, &token, "Warm-up").await;

        let res = app
            .post_with_token(
                &routes::playlist_problems(id),
                &json!({"problem_ids": [first, 9999]}),
                &token,
            )
            .await;

        assert_eq!(res.status, 404);
        let detail = app.get_with_token(&routes::playlist(id), &token).await;
        assert_eq!(detail.body["problems"], json!([]));
    }

    #[tokio::test]
    async fn empty_problem_list_is_rejected() {
        let (app, token, _, _) = setup().await;
        let id = create_playlist(&app, &token, "Warm-up").await;

        let res = app
            .post_with_token(
                &routes::playlist_problems(id),
                &json!({"problem_ids": []}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
