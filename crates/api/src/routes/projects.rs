use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::projects;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET   /                -> list_projects
/// POST  /                -> create_project
/// GET   /{id}            -> get_project
/// PATCH /{id}/favorite   -> set_favorite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/{id}", get(projects::get_project))
        .route("/{id}/favorite", patch(projects::set_favorite))
}
