use adstudio_core::upload::MAX_AVATAR_BYTES;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::profile;
use crate::routes::uploads::multipart_body_limit;
use crate::state::AppState;

/// Routes mounted at `/profile`.
///
/// ```text
/// GET   /        -> get_profile
/// PATCH /        -> update_profile
/// POST  /avatar  -> upload_avatar
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route(
            "/avatar",
            post(profile::upload_avatar)
                .layer(DefaultBodyLimit::max(multipart_body_limit(MAX_AVATAR_BYTES))),
        )
}
