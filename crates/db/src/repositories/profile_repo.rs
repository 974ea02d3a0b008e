//! Repository for the `profiles` table.

use adstudio_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{Profile, UpdateProfile};

const COLUMNS: &str =
    "user_id, email, full_name, company_name, avatar_url, locale, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn find(pool: &PgPool, user_id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the profile on first access; an existing row only has its
    /// email refreshed when one is supplied.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        email: Option<&str>,
    ) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (user_id, email) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE \
                 SET email = COALESCE(EXCLUDED.email, profiles.email) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(email)
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET \
                 full_name = COALESCE($2, full_name), \
                 company_name = COALESCE($3, company_name), \
                 locale = COALESCE($4, locale), \
                 updated_at = NOW() \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(&input.full_name)
            .bind(&input.company_name)
            .bind(&input.locale)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_avatar(
        pool: &PgPool,
        user_id: DbId,
        avatar_url: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET avatar_url = $2, updated_at = NOW() \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(avatar_url)
            .fetch_optional(pool)
            .await
    }
}
