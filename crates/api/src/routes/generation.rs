use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// Routes mounted at `/generate`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/site-analysis", post(generation::site_analysis))
        .route("/video", post(generation::video))
        .route("/image", post(generation::image))
        .route("/social-content", post(generation::social_content))
        .route("/product-data", post(generation::product_data))
        .route("/prompt-ideas", post(generation::prompt_ideas))
}
