//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Values are clamped with `clamp_limit` / `clamp_offset` before they
/// reach the store.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Gallery listing parameters for `GET /projects`.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryParams {
    pub product_type: Option<String>,
    #[serde(default)]
    pub favorites: bool,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
