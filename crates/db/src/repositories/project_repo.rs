//! Repository for the `saved_projects` table (the gallery).

use adstudio_core::gallery::{GalleryFilter, GallerySort};
use adstudio_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{NewProject, SavedProject};

const COLUMNS: &str = "\
    id, user_id, business_id, product_type, title, media_urls, thumbnail_url, \
    parameters, is_favorite, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NewProject,
    ) -> Result<SavedProject, sqlx::Error> {
        let query = format!(
            "INSERT INTO saved_projects \
                 (user_id, business_id, product_type, title, media_urls, thumbnail_url, parameters) \
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, '{{}}'::jsonb)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SavedProject>(&query)
            .bind(user_id)
            .bind(input.business_id)
            .bind(input.product_type.as_str())
            .bind(&input.title)
            .bind(&input.media_urls)
            .bind(&input.thumbnail_url)
            .bind(&input.parameters)
            .fetch_one(pool)
            .await
    }

    /// Find a project owned by `user_id`.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<SavedProject>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM saved_projects WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, SavedProject>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// One gallery page. Search matches the title or the `prompt`
    /// generation parameter, case-insensitively.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        filter: &GalleryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SavedProject>, sqlx::Error> {
        let order = match filter.sort {
            GallerySort::Newest => "DESC",
            GallerySort::Oldest => "ASC",
        };
        let pattern = filter.search_term().map(|term| format!("%{}%", escape_like(&term)));
        let query = format!(
            "SELECT {COLUMNS} FROM saved_projects \
             WHERE user_id = $1 \
               AND ($2::TEXT IS NULL OR product_type = $2) \
               AND (NOT $3 OR is_favorite) \
               AND ($4::TEXT IS NULL OR title ILIKE $4 OR parameters->>'prompt' ILIKE $4) \
             ORDER BY created_at {order} \
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, SavedProject>(&query)
            .bind(user_id)
            .bind(filter.product_type.map(|p| p.as_str()))
            .bind(filter.favorites_only)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn set_favorite(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        is_favorite: bool,
    ) -> Result<Option<SavedProject>, sqlx::Error> {
        let query = format!(
            "UPDATE saved_projects SET is_favorite = $3, updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SavedProject>(&query)
            .bind(id)
            .bind(user_id)
            .bind(is_favorite)
            .fetch_optional(pool)
            .await
    }
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }
}
