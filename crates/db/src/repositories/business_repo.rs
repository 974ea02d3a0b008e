//! Repository for `businesses` and the `business_users` link table.

use adstudio_core::types::DbId;
use sqlx::PgPool;

use crate::models::business::{Business, LinkedBusiness, NewBusiness, UnlinkOutcome};

const COLUMNS: &str = "id, url, name, created_by, detached_at, created_at, updated_at";

pub struct BusinessRepo;

impl BusinessRepo {
    /// Look up a business by its normalized URL, detached or not.
    pub async fn find_by_url(pool: &PgPool, url: &str) -> Result<Option<Business>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM businesses WHERE url = $1");
        sqlx::query_as::<_, Business>(&query)
            .bind(url)
            .fetch_optional(pool)
            .await
    }

    /// Insert a business. A concurrent insert of the same URL returns the
    /// existing row.
    pub async fn create(pool: &PgPool, input: &NewBusiness) -> Result<Business, sqlx::Error> {
        let query = format!(
            "INSERT INTO businesses (url, name, created_by) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (url) DO UPDATE SET name = COALESCE(businesses.name, EXCLUDED.name) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Business>(&query)
            .bind(&input.url)
            .bind(&input.name)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Link a user to a business and clear any soft-delete marker.
    ///
    /// Linking an already-linked user keeps the existing role.
    pub async fn link_user(
        pool: &PgPool,
        business_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "INSERT INTO business_users (business_id, user_id, role) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (business_id, user_id) DO NOTHING",
        )
        .bind(business_id)
        .bind(user_id)
        .bind(role)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE businesses SET detached_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND detached_at IS NOT NULL",
        )
        .bind(business_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    /// Businesses the user is linked to, excluding soft-deleted ones.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<LinkedBusiness>, sqlx::Error> {
        sqlx::query_as::<_, LinkedBusiness>(
            "SELECT b.id, b.url, b.name, bu.role, bu.created_at AS linked_at, b.created_at \
             FROM businesses b \
             JOIN business_users bu ON bu.business_id = b.id \
             WHERE bu.user_id = $1 AND b.detached_at IS NULL \
             ORDER BY bu.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn is_linked(
        pool: &PgPool,
        business_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (linked,): (bool,) = sqlx::query_as(
            "SELECT EXISTS( \
                 SELECT 1 FROM business_users bu \
                 JOIN businesses b ON b.id = bu.business_id \
                 WHERE bu.business_id = $1 AND bu.user_id = $2 AND b.detached_at IS NULL)",
        )
        .bind(business_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;
        Ok(linked)
    }

    /// Remove a user's link. When no links remain the business is
    /// soft-deleted by stamping `detached_at`.
    ///
    /// The business row is locked for the duration so two concurrent
    /// unlinks cannot both observe a remaining link. Returns `None` when
    /// the link does not exist.
    pub async fn unlink_user(
        pool: &PgPool,
        business_id: DbId,
        user_id: DbId,
    ) -> Result<Option<UnlinkOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM businesses WHERE id = $1 FOR UPDATE")
            .bind(business_id)
            .fetch_optional(&mut *tx)
            .await?;

        let deleted = sqlx::query(
            "DELETE FROM business_users WHERE business_id = $1 AND user_id = $2",
        )
        .bind(business_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let (remaining_links,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM business_users WHERE business_id = $1")
                .bind(business_id)
                .fetch_one(&mut *tx)
                .await?;

        let detached = remaining_links == 0;
        if detached {
            sqlx::query(
                "UPDATE businesses SET detached_at = NOW(), updated_at = NOW() WHERE id = $1",
            )
            .bind(business_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(UnlinkOutcome {
            detached,
            remaining_links,
        }))
    }
}
