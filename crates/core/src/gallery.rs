//! Gallery filtering for saved projects.
//!
//! The Postgres repository expresses the same filter in SQL; this module is
//! the reference used by the in-memory store and by client-side listing.

use serde::{Deserialize, Serialize};

use crate::product::ProductType;
use crate::types::Timestamp;

/// Default page size for gallery listings.
pub const DEFAULT_PAGE_SIZE: i64 = 24;

/// Upper bound on a single gallery page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Anything the gallery can list.
pub trait GalleryItem {
    fn product_type(&self) -> ProductType;
    fn is_favorite(&self) -> bool;
    fn created_at(&self) -> Timestamp;
    /// Text fields searched by [`GalleryFilter::search`]. Each field is
    /// matched on its own, never concatenated.
    fn search_fields(&self) -> Vec<&str>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GallerySort {
    #[default]
    Newest,
    Oldest,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    pub product_type: Option<ProductType>,
    pub favorites_only: bool,
    pub search: Option<String>,
    pub sort: GallerySort,
}

impl GalleryFilter {
    /// Lowercased search needle, `None` when blank.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches<T: GalleryItem>(&self, item: &T) -> bool {
        if let Some(product_type) = self.product_type {
            if item.product_type() != product_type {
                return false;
            }
        }
        if self.favorites_only && !item.is_favorite() {
            return false;
        }
        match self.search_term() {
            Some(needle) => item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle)),
            None => true,
        }
    }

    /// Filter and sort `items`.
    pub fn apply<T: GalleryItem>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let mut kept: Vec<T> = items.into_iter().filter(|item| self.matches(item)).collect();
        match self.sort {
            GallerySort::Newest => kept.sort_by_key(|item| std::cmp::Reverse(item.created_at())),
            GallerySort::Oldest => kept.sort_by_key(|item| item.created_at()),
        }
        kept
    }
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Negative offsets become zero.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
