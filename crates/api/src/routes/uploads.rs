use adstudio_core::upload::MAX_UPLOAD_BYTES;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::uploads;
use crate::state::AppState;

/// Room for multipart boundaries and the non-file parts.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

/// Body limit for a multipart route whose file part is capped at
/// `max_file_bytes`. Oversized files are caught by the handler first so
/// the client sees the localized size error.
pub fn multipart_body_limit(max_file_bytes: u64) -> usize {
    (max_file_bytes + MULTIPART_OVERHEAD_BYTES) as usize
}

/// Upload and download routes, mounted at the API root.
///
/// ```text
/// POST /uploads           -> upload
/// POST /uploads/from-url  -> upload_from_url
/// GET  /downloads         -> download
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/uploads",
            post(uploads::upload)
                .layer(DefaultBodyLimit::max(multipart_body_limit(MAX_UPLOAD_BYTES))),
        )
        .route("/uploads/from-url", post(uploads::upload_from_url))
        .route("/downloads", get(uploads::download))
}
