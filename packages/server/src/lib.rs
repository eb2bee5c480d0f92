pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod judge;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LeetLab API",
        version = "1.0.0",
        description = "API for the LeetLab coding practice platform"
    ),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::me,
        handlers::execute::execute_code,
        handlers::problem::create_problem,
        handlers::problem::list_problems,
        handlers::problem::list_solved_problems,
        handlers::problem::get_problem,
        handlers::problem::update_problem,
        handlers::problem::delete_problem,
        handlers::submission::list_my_submissions,
        handlers::submission::get_submission,
        handlers::submission::list_problem_submissions,
        handlers::submission::count_problem_submissions,
        handlers::playlist::create_playlist,
        handlers::playlist::list_playlists,
        handlers::playlist::get_playlist,
        handlers::playlist::delete_playlist,
        handlers::playlist::add_problems,
        handlers::playlist::remove_problems,
    ),
    tags(
        (name = "Auth", description = "Authentication and user profile"),
        (name = "Execution", description = "Running and judging user code"),
        (name = "Problems", description = "Problem CRUD with reference-solution validation"),
        (name = "Submissions", description = "Submission history"),
        (name = "Playlists", description = "User-curated problem lists"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    let api = ApiDoc::openapi();

    axum::Router::new()
        .nest("/api", routes::api_routes())
        .route(
            "/api-docs/openapi.json",
            axum::routing::get({
                let api = api.clone();
                move || async move { axum::Json(api) }
            }),
        )
        .with_state(state)
        .merge(Scalar::with_url("/scalar", api))
        .layer(cors)
}
