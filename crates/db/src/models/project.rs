//! Saved gallery projects.

use adstudio_core::gallery::GalleryItem;
use adstudio_core::product::ProductType;
use adstudio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `saved_projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SavedProject {
    pub id: DbId,
    pub user_id: DbId,
    pub business_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub product_type: ProductType,
    pub title: Option<String>,
    pub media_urls: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub parameters: serde_json::Value,
    pub is_favorite: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Body of `POST /api/v1/projects`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub business_id: Option<DbId>,
    pub product_type: ProductType,
    pub title: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

impl GalleryItem for SavedProject {
    fn product_type(&self) -> ProductType {
        self.product_type
    }

    fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Title and the generation prompt, matched per column like the SQL.
    fn search_fields(&self) -> Vec<&str> {
        let prompt = self.parameters.get("prompt").and_then(|p| p.as_str());
        self.title.as_deref().into_iter().chain(prompt).collect()
    }
}
