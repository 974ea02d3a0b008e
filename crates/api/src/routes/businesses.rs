use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::businesses;
use crate::state::AppState;

/// Routes mounted at `/businesses`.
///
/// ```text
/// GET    /             -> list
/// POST   /connect      -> connect
/// DELETE /{id}/link    -> unlink
/// GET    /{id}/jobs    -> list_jobs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(businesses::list))
        .route("/connect", post(businesses::connect))
        .route("/{id}/link", delete(businesses::unlink))
        .route("/{id}/jobs", get(businesses::list_jobs))
}
