pub mod auth;
pub mod businesses;
pub mod generation;
pub mod health;
pub mod jobs;
pub mod profile;
pub mod projects;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/sign-in                     password sign-in (public)
/// /auth/callback                    OAuth code exchange (public)
/// /auth/sign-out                    clear session (public)
///
/// /businesses                       list linked businesses
/// /businesses/connect               connect a website (POST)
/// /businesses/{id}/link             unlink caller (DELETE)
/// /businesses/{id}/jobs             recent jobs for a business
///
/// /jobs/{id}                        poll job status
/// /jobs/{id}/callback               workflow callback (signed, no user auth)
///
/// /generate/site-analysis           job-backed (POST)
/// /generate/video                   job-backed (POST)
/// /generate/image                   job-backed (POST)
/// /generate/social-content          job-backed (POST)
/// /generate/product-data            synchronous (POST)
/// /generate/prompt-ideas            synchronous (POST)
///
/// /profile                          get, update
/// /profile/avatar                   upload avatar (POST, multipart)
///
/// /uploads                          upload image (POST, multipart)
/// /uploads/from-url                 copy remote image (POST)
/// /downloads                        proxied attachment download
///
/// /projects                         list (filtered), save
/// /projects/{id}                    get
/// /projects/{id}/favorite           toggle favorite (PATCH)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/businesses", businesses::router())
        .nest("/jobs", jobs::router())
        .nest("/generate", generation::router())
        .nest("/profile", profile::router())
        .merge(uploads::router())
        .nest("/projects", projects::router())
}
