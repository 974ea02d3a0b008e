//! Integration tests for the gallery listing SQL: filters, search and sort.

use adstudio_core::gallery::{GalleryFilter, GallerySort};
use adstudio_core::product::ProductType;
use adstudio_core::types::DbId;
use adstudio_db::models::project::NewProject;
use adstudio_db::repositories::ProjectRepo;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a project and pin its `created_at` to `days_ago` days in the past.
async fn saved(
    pool: &PgPool,
    user_id: DbId,
    product_type: ProductType,
    title: &str,
    prompt: &str,
    days_ago: i32,
) -> DbId {
    let project = ProjectRepo::create(
        pool,
        user_id,
        &NewProject {
            business_id: None,
            product_type,
            title: Some(title.to_string()),
            media_urls: vec![],
            thumbnail_url: None,
            parameters: Some(json!({ "prompt": prompt })),
        },
    )
    .await
    .unwrap();

    sqlx::query("UPDATE saved_projects SET created_at = NOW() - make_interval(days => $2) WHERE id = $1")
        .bind(project.id)
        .bind(days_ago)
        .execute(pool)
        .await
        .unwrap();
    project.id
}

async fn titles(pool: &PgPool, user_id: DbId, filter: GalleryFilter) -> Vec<String> {
    ProjectRepo::list(pool, user_id, &filter, 50, 0)
        .await
        .unwrap()
        .into_iter()
        .filter_map(|p| p.title)
        .collect()
}

fn search(term: &str) -> GalleryFilter {
    GalleryFilter {
        search: Some(term.to_string()),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_sort_newest_and_oldest(pool: PgPool) {
    let user = Uuid::new_v4();
    saved(&pool, user, ProductType::Image, "Old", "", 3).await;
    saved(&pool, user, ProductType::Video, "Mid", "", 2).await;
    saved(&pool, user, ProductType::Image, "New", "", 1).await;

    assert_eq!(titles(&pool, user, GalleryFilter::default()).await, ["New", "Mid", "Old"]);

    let oldest = GalleryFilter {
        sort: GallerySort::Oldest,
        ..Default::default()
    };
    assert_eq!(titles(&pool, user, oldest).await, ["Old", "Mid", "New"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_filter_by_product_type_and_favorite(pool: PgPool) {
    let user = Uuid::new_v4();
    let banner = saved(&pool, user, ProductType::Image, "Banner", "", 2).await;
    saved(&pool, user, ProductType::Image, "Poster", "", 1).await;
    saved(&pool, user, ProductType::Video, "Teaser", "", 1).await;
    ProjectRepo::set_favorite(&pool, user, banner, true).await.unwrap();

    let images = GalleryFilter {
        product_type: Some(ProductType::Image),
        ..Default::default()
    };
    assert_eq!(titles(&pool, user, images).await, ["Poster", "Banner"]);

    let favorites = GalleryFilter {
        favorites_only: true,
        ..Default::default()
    };
    assert_eq!(titles(&pool, user, favorites).await, ["Banner"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_title_or_prompt_per_column(pool: PgPool) {
    let user = Uuid::new_v4();
    saved(&pool, user, ProductType::Image, "Spring sale", "summer palette", 1).await;
    saved(&pool, user, ProductType::Image, "Lookbook", "", 2).await;

    assert_eq!(titles(&pool, user, search("SALE")).await, ["Spring sale"]);
    assert_eq!(titles(&pool, user, search("palette")).await, ["Spring sale"]);
    assert!(titles(&pool, user, search("sale sum")).await.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_wildcards_match_literally(pool: PgPool) {
    let user = Uuid::new_v4();
    saved(&pool, user, ProductType::Image, "50% off", "", 1).await;
    saved(&pool, user, ProductType::Image, "500 offers", "", 2).await;

    assert_eq!(titles(&pool, user, search("50%")).await, ["50% off"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_listing_is_owner_scoped(pool: PgPool) {
    let (owner, other) = (Uuid::new_v4(), Uuid::new_v4());
    let id = saved(&pool, owner, ProductType::Social, "Carousel", "", 1).await;

    assert!(titles(&pool, other, GalleryFilter::default()).await.is_empty());
    assert!(ProjectRepo::find(&pool, other, id).await.unwrap().is_none());
    assert!(ProjectRepo::set_favorite(&pool, other, id, true).await.unwrap().is_none());
}
