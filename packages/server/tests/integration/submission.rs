use crate::common::{TestApp, routes};

async fn setup() -> (TestApp, String, i32) {
    let app = TestApp::spawn().await;
    let admin = app.create_admin().await;
    let problem_id = app.create_problem(&admin, "Add Two Numbers").await;
    let token = app.create_authenticated_user("alice@example.com").await;
    (app, token, problem_id)
}

mod history {
    use super::*;

    #[tokio::test]
    async fn user_sees_only_their_own_submissions() {
        let (app, alice, problem_id) = setup().await;
        let bob = app.create_authenticated_user("bob@example.com").await;

        app.execute(&alice, problem_id, "print(a + b)", &["1 2"], &["3"]).await;
        app.execute(&alice, problem_id, "print(a + b)", &["1 2"], &["4"]).await;
        app.execute(&bob, problem_id, "print(a + b)", &["1 2"], &["3"]).await;

        let res = app.get_with_token(routes::SUBMISSIONS, &alice).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 2);
        let data = res.body["data"].as_array().unwrap();
        // newest first
        assert_eq!(data[0]["verdict"], "Wrong Answer");
        assert_eq!(data[1]["verdict"], "Accepted");
        assert!(data[0].get("test_cases").is_none());
    }

    #[tokio::test]
    async fn list_can_be_filtered_by_verdict() {
        let (app, token, problem_id) = setup().await;
        app.execute(&token, problem_id, "print(a + b)", &["1 2"], &["3"]).await;
        app.execute(&token, problem_id, "print(a + b)", &["1 2"], &["4"]).await;

        let res = app
            .get_with_token(
                &format!("{}?verdict=Accepted", routes::SUBMISSIONS),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["pagination"]["total"], 1);
    }

    #[tokio::test]
    async fn problem_history_and_count() {
        let (app, alice, problem_id) = setup().await;
        let bob = app.create_authenticated_user("bob@example.com").await;
        app.execute(&alice, problem_id, "print(a + b)", &["1 2"], &["3"]).await;
        app.execute(&bob, problem_id, "print(a + b)", &["1 2"], &["3"]).await;
        app.execute(&bob, problem_id, "print(a + b)", &["3 4"], &["7"]).await;

        let mine = app
            .get_with_token(&routes::problem_submissions(problem_id), &alice)
            .await;
        assert_eq!(mine.status, 200, "{}", mine.text);
        assert_eq!(mine.body["pagination"]["total"], 1);

        let count = app
            .get_with_token(&routes::problem_submission_count(problem_id), &alice)
            .await;
        assert_eq!(count.status, 200, "{}", count.text);
        assert_eq!(count.body["count"], 3);
        assert_eq!(count.body["problem_id"], problem_id);
    }

    #[tokio::test]
    async fn count_for_missing_problem_is_not_found() {
        let (app, token, _) = setup().await;

        let res = app
            .get_with_token(&routes::problem_submission_count(9999), &token)
            .await;

        assert_eq!(res.status, 404);
    }
}

mod detail {
    use super::*;

    #[tokio::test]
    async fn owner_can_read_a_submission_with_its_cases() {
        let (app, token, problem_id) = setup().await;
        let run = app
            .execute(&token, problem_id, "print(a + b)", &["1 2", "3 4"], &["3", "7"])
            .await;
        let id = run.body["submission"]["id"].as_i64().unwrap() as i32;

        let res = app.get_with_token(&routes::submission(id), &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let cases = res.body["test_cases"].as_array().unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0]["test_case"], 1);
        assert_eq!(cases[1]["test_case"], 2);
    }

    #[tokio::test]
    async fn other_users_cannot_read_it() {
        let (app, alice, problem_id) = setup().await;
        let bob = app.create_authenticated_user("bob@example.com").await;
        let run = app.execute(&alice, problem_id, "print(a + b)", &["1 2"], &["3"]).await;
        let id = run.body["submission"]["id"].as_i64().unwrap() as i32;

        let res = app.get_with_token(&routes::submission(id), &bob).await;

        assert_eq!(res.status, 404);
    }
}
