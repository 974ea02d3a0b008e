//! Store traits held by the API state.
//!
//! Handlers talk to `Arc<dyn Database>` so integration tests can run
//! against [`crate::memory::MemoryDatabase`] without Postgres.
//! [`PgDatabase`] forwards every call to the matching repository.

use adstudio_core::gallery::GalleryFilter;
use adstudio_core::types::DbId;
use async_trait::async_trait;

use crate::models::business::{Business, LinkedBusiness, NewBusiness, UnlinkOutcome};
use crate::models::job::{Job, JobCallback, NewJob};
use crate::models::profile::{Profile, UpdateProfile};
use crate::models::project::{NewProject, SavedProject};
use crate::repositories::{BusinessRepo, JobRepo, ProfileRepo, ProjectRepo};
use crate::DbPool;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create_job(&self, input: NewJob) -> Result<Job, sqlx::Error>;
    async fn find_job(&self, id: DbId) -> Result<Option<Job>, sqlx::Error>;
    async fn fail_job(&self, id: DbId, error: &str) -> Result<(), sqlx::Error>;
    async fn apply_job_callback(
        &self,
        id: DbId,
        callback: JobCallback,
    ) -> Result<Option<Job>, sqlx::Error>;
    async fn list_jobs_for_business(
        &self,
        user_id: DbId,
        business_id: DbId,
        limit: i64,
    ) -> Result<Vec<Job>, sqlx::Error>;
}

#[async_trait]
pub trait BusinessStore: Send + Sync {
    async fn find_business_by_url(&self, url: &str) -> Result<Option<Business>, sqlx::Error>;
    async fn create_business(&self, input: NewBusiness) -> Result<Business, sqlx::Error>;
    async fn link_user(&self, business_id: DbId, user_id: DbId, role: &str)
        -> Result<(), sqlx::Error>;
    async fn list_businesses(&self, user_id: DbId) -> Result<Vec<LinkedBusiness>, sqlx::Error>;
    async fn is_linked(&self, business_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error>;
    async fn unlink_user(
        &self,
        business_id: DbId,
        user_id: DbId,
    ) -> Result<Option<UnlinkOutcome>, sqlx::Error>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create_project(
        &self,
        user_id: DbId,
        input: NewProject,
    ) -> Result<SavedProject, sqlx::Error>;
    async fn find_project(
        &self,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<SavedProject>, sqlx::Error>;
    async fn list_projects(
        &self,
        user_id: DbId,
        filter: GalleryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SavedProject>, sqlx::Error>;
    async fn set_favorite(
        &self,
        user_id: DbId,
        id: DbId,
        is_favorite: bool,
    ) -> Result<Option<SavedProject>, sqlx::Error>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: DbId) -> Result<Option<Profile>, sqlx::Error>;
    async fn upsert_profile(
        &self,
        user_id: DbId,
        email: Option<String>,
    ) -> Result<Profile, sqlx::Error>;
    async fn update_profile(
        &self,
        user_id: DbId,
        input: UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error>;
    async fn set_avatar(
        &self,
        user_id: DbId,
        avatar_url: &str,
    ) -> Result<Option<Profile>, sqlx::Error>;
}

/// Everything the API needs from persistence.
#[async_trait]
pub trait Database: JobStore + BusinessStore + ProjectStore + ProfileStore {
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

/// Postgres-backed [`Database`].
#[derive(Clone)]
pub struct PgDatabase {
    pool: DbPool,
}

impl PgDatabase {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl JobStore for PgDatabase {
    async fn create_job(&self, input: NewJob) -> Result<Job, sqlx::Error> {
        JobRepo::create(&self.pool, &input).await
    }

    async fn find_job(&self, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        JobRepo::find_by_id(&self.pool, id).await
    }

    async fn fail_job(&self, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        JobRepo::fail(&self.pool, id, error).await
    }

    async fn apply_job_callback(
        &self,
        id: DbId,
        callback: JobCallback,
    ) -> Result<Option<Job>, sqlx::Error> {
        JobRepo::apply_callback(&self.pool, id, &callback).await
    }

    async fn list_jobs_for_business(
        &self,
        user_id: DbId,
        business_id: DbId,
        limit: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        JobRepo::list_for_business(&self.pool, user_id, business_id, limit).await
    }
}

#[async_trait]
impl BusinessStore for PgDatabase {
    async fn find_business_by_url(&self, url: &str) -> Result<Option<Business>, sqlx::Error> {
        BusinessRepo::find_by_url(&self.pool, url).await
    }

    async fn create_business(&self, input: NewBusiness) -> Result<Business, sqlx::Error> {
        BusinessRepo::create(&self.pool, &input).await
    }

    async fn link_user(
        &self,
        business_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<(), sqlx::Error> {
        BusinessRepo::link_user(&self.pool, business_id, user_id, role).await
    }

    async fn list_businesses(&self, user_id: DbId) -> Result<Vec<LinkedBusiness>, sqlx::Error> {
        BusinessRepo::list_for_user(&self.pool, user_id).await
    }

    async fn is_linked(&self, business_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        BusinessRepo::is_linked(&self.pool, business_id, user_id).await
    }

    async fn unlink_user(
        &self,
        business_id: DbId,
        user_id: DbId,
    ) -> Result<Option<UnlinkOutcome>, sqlx::Error> {
        BusinessRepo::unlink_user(&self.pool, business_id, user_id).await
    }
}

#[async_trait]
impl ProjectStore for PgDatabase {
    async fn create_project(
        &self,
        user_id: DbId,
        input: NewProject,
    ) -> Result<SavedProject, sqlx::Error> {
        ProjectRepo::create(&self.pool, user_id, &input).await
    }

    async fn find_project(
        &self,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<SavedProject>, sqlx::Error> {
        ProjectRepo::find(&self.pool, user_id, id).await
    }

    async fn list_projects(
        &self,
        user_id: DbId,
        filter: GalleryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SavedProject>, sqlx::Error> {
        ProjectRepo::list(&self.pool, user_id, &filter, limit, offset).await
    }

    async fn set_favorite(
        &self,
        user_id: DbId,
        id: DbId,
        is_favorite: bool,
    ) -> Result<Option<SavedProject>, sqlx::Error> {
        ProjectRepo::set_favorite(&self.pool, user_id, id, is_favorite).await
    }
}

#[async_trait]
impl ProfileStore for PgDatabase {
    async fn find_profile(&self, user_id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        ProfileRepo::find(&self.pool, user_id).await
    }

    async fn upsert_profile(
        &self,
        user_id: DbId,
        email: Option<String>,
    ) -> Result<Profile, sqlx::Error> {
        ProfileRepo::upsert(&self.pool, user_id, email.as_deref()).await
    }

    async fn update_profile(
        &self,
        user_id: DbId,
        input: UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        ProfileRepo::update(&self.pool, user_id, &input).await
    }

    async fn set_avatar(
        &self,
        user_id: DbId,
        avatar_url: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        ProfileRepo::set_avatar(&self.pool, user_id, avatar_url).await
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }
}
