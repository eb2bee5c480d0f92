use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/execute-code", post(handlers::execute::execute_code))
        .nest("/auth", auth_routes())
        .nest("/problems", problem_routes())
        .nest("/submissions", submission_routes())
        .nest("/playlists", playlist_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/me", get(handlers::auth::me))
}

fn problem_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::problem::list_problems).post(handlers::problem::create_problem),
        )
        .route("/solved", get(handlers::problem::list_solved_problems))
        .route(
            "/{id}",
            get(handlers::problem::get_problem)
                .patch(handlers::problem::update_problem)
                .delete(handlers::problem::delete_problem),
        )
        .route(
            "/{id}/submissions",
            get(handlers::submission::list_problem_submissions),
        )
        .route(
            "/{id}/submissions/count",
            get(handlers::submission::count_problem_submissions),
        )
}

fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::submission::list_my_submissions))
        .route("/{id}", get(handlers::submission::get_submission))
}

fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::playlist::list_playlists).post(handlers::playlist::create_playlist),
        )
        .route(
            "/{id}",
            get(handlers::playlist::get_playlist).delete(handlers::playlist::delete_playlist),
        )
        .route(
            "/{id}/problems",
            post(handlers::playlist::add_problems).delete(handlers::playlist::remove_problems),
        )
}
