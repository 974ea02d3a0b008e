//! In-memory [`Database`] for tests.
//!
//! Mirrors the Postgres repositories' semantics (soft-delete on last
//! unlink, callback overwrites, owner-scoped projects) without a server.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use adstudio_core::gallery::GalleryFilter;
use adstudio_core::job::JobStatus;
use adstudio_core::types::{DbId, Timestamp};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::models::business::{Business, LinkedBusiness, NewBusiness, UnlinkOutcome};
use crate::models::job::{Job, JobCallback, NewJob};
use crate::models::profile::{Profile, UpdateProfile};
use crate::models::project::{NewProject, SavedProject};
use crate::store::{BusinessStore, Database, JobStore, ProfileStore, ProjectStore};

#[derive(Debug, Clone)]
struct Link {
    business_id: DbId,
    user_id: DbId,
    role: String,
    created_at: Timestamp,
}

#[derive(Default)]
struct Inner {
    jobs: HashMap<DbId, Job>,
    businesses: HashMap<DbId, Business>,
    links: Vec<Link>,
    projects: HashMap<DbId, SavedProject>,
    profiles: HashMap<DbId, Profile>,
}

#[derive(Default)]
pub struct MemoryDatabase {
    inner: Mutex<Inner>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of a business row, including detached ones.
    pub fn business(&self, id: DbId) -> Option<Business> {
        self.lock().businesses.get(&id).cloned()
    }

    /// Snapshot of a job row.
    pub fn job(&self, id: DbId) -> Option<Job> {
        self.lock().jobs.get(&id).cloned()
    }

    pub fn job_count(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn link_count(&self, business_id: DbId) -> usize {
        self.lock()
            .links
            .iter()
            .filter(|l| l.business_id == business_id)
            .count()
    }
}

#[async_trait]
impl JobStore for MemoryDatabase {
    async fn create_job(&self, input: NewJob) -> Result<Job, sqlx::Error> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            business_id: input.business_id,
            product: input.job_type.product().to_string(),
            job_type: input.job_type,
            status: JobStatus::Processing,
            request_payload: input.request_payload,
            result_payload: None,
            error_message: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        self.lock().jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn find_job(&self, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        Ok(self.lock().jobs.get(&id).cloned())
    }

    async fn fail_job(&self, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        if let Some(job) = self.lock().jobs.get_mut(&id) {
            let now = Utc::now();
            job.status = JobStatus::Failed;
            job.error_message = Some(error.to_string());
            job.completed_at = Some(now);
            job.updated_at = now;
        }
        Ok(())
    }

    async fn apply_job_callback(
        &self,
        id: DbId,
        callback: JobCallback,
    ) -> Result<Option<Job>, sqlx::Error> {
        let mut inner = self.lock();
        let Some(job) = inner.jobs.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        let status = JobStatus::from(callback.status);
        job.status = status;
        job.result_payload = callback.result;
        job.error_message = callback.error;
        job.completed_at = status.is_terminal().then_some(now);
        job.updated_at = now;
        Ok(Some(job.clone()))
    }

    async fn list_jobs_for_business(
        &self,
        user_id: DbId,
        business_id: DbId,
        limit: i64,
    ) -> Result<Vec<Job>, sqlx::Error> {
        let mut jobs: Vec<Job> = self
            .lock()
            .jobs
            .values()
            .filter(|j| j.user_id == user_id && j.business_id == Some(business_id))
            .cloned()
            .collect();
        jobs.sort_by_key(|j| std::cmp::Reverse(j.created_at));
        jobs.truncate(limit.max(0) as usize);
        Ok(jobs)
    }
}

#[async_trait]
impl BusinessStore for MemoryDatabase {
    async fn find_business_by_url(&self, url: &str) -> Result<Option<Business>, sqlx::Error> {
        Ok(self.lock().businesses.values().find(|b| b.url == url).cloned())
    }

    async fn create_business(&self, input: NewBusiness) -> Result<Business, sqlx::Error> {
        let mut inner = self.lock();
        if let Some(existing) = inner.businesses.values().find(|b| b.url == input.url) {
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let business = Business {
            id: Uuid::new_v4(),
            url: input.url,
            name: input.name,
            created_by: input.created_by,
            detached_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn link_user(
        &self,
        business_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<(), sqlx::Error> {
        let mut inner = self.lock();
        let exists = inner
            .links
            .iter()
            .any(|l| l.business_id == business_id && l.user_id == user_id);
        if !exists {
            inner.links.push(Link {
                business_id,
                user_id,
                role: role.to_string(),
                created_at: Utc::now(),
            });
        }
        if let Some(business) = inner.businesses.get_mut(&business_id) {
            if business.detached_at.take().is_some() {
                business.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn list_businesses(&self, user_id: DbId) -> Result<Vec<LinkedBusiness>, sqlx::Error> {
        let inner = self.lock();
        let mut out: Vec<LinkedBusiness> = inner
            .links
            .iter()
            .filter(|l| l.user_id == user_id)
            .filter_map(|l| {
                let b = inner.businesses.get(&l.business_id)?;
                if b.detached_at.is_some() {
                    return None;
                }
                Some(LinkedBusiness {
                    id: b.id,
                    url: b.url.clone(),
                    name: b.name.clone(),
                    role: l.role.clone(),
                    linked_at: l.created_at,
                    created_at: b.created_at,
                })
            })
            .collect();
        out.sort_by_key(|b| std::cmp::Reverse(b.linked_at));
        Ok(out)
    }

    async fn is_linked(&self, business_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let inner = self.lock();
        let active = inner
            .businesses
            .get(&business_id)
            .is_some_and(|b| b.detached_at.is_none());
        Ok(active
            && inner
                .links
                .iter()
                .any(|l| l.business_id == business_id && l.user_id == user_id))
    }

    async fn unlink_user(
        &self,
        business_id: DbId,
        user_id: DbId,
    ) -> Result<Option<UnlinkOutcome>, sqlx::Error> {
        let mut inner = self.lock();
        let before = inner.links.len();
        inner
            .links
            .retain(|l| !(l.business_id == business_id && l.user_id == user_id));
        if inner.links.len() == before {
            return Ok(None);
        }

        let remaining_links = inner
            .links
            .iter()
            .filter(|l| l.business_id == business_id)
            .count() as i64;
        let detached = remaining_links == 0;
        if detached {
            if let Some(business) = inner.businesses.get_mut(&business_id) {
                let now = Utc::now();
                business.detached_at = Some(now);
                business.updated_at = now;
            }
        }
        Ok(Some(UnlinkOutcome {
            detached,
            remaining_links,
        }))
    }
}

#[async_trait]
impl ProjectStore for MemoryDatabase {
    async fn create_project(
        &self,
        user_id: DbId,
        input: NewProject,
    ) -> Result<SavedProject, sqlx::Error> {
        let now = Utc::now();
        let project = SavedProject {
            id: Uuid::new_v4(),
            user_id,
            business_id: input.business_id,
            product_type: input.product_type,
            title: input.title,
            media_urls: input.media_urls,
            thumbnail_url: input.thumbnail_url,
            parameters: input.parameters.unwrap_or_else(|| serde_json::json!({})),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        self.lock().projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_project(
        &self,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<SavedProject>, sqlx::Error> {
        Ok(self
            .lock()
            .projects
            .get(&id)
            .filter(|p| p.user_id == user_id)
            .cloned())
    }

    async fn list_projects(
        &self,
        user_id: DbId,
        filter: GalleryFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SavedProject>, sqlx::Error> {
        let owned: Vec<SavedProject> = self
            .lock()
            .projects
            .values()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(filter
            .apply(owned)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn set_favorite(
        &self,
        user_id: DbId,
        id: DbId,
        is_favorite: bool,
    ) -> Result<Option<SavedProject>, sqlx::Error> {
        let mut inner = self.lock();
        let Some(project) = inner.projects.get_mut(&id).filter(|p| p.user_id == user_id) else {
            return Ok(None);
        };
        project.is_favorite = is_favorite;
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }
}

#[async_trait]
impl ProfileStore for MemoryDatabase {
    async fn find_profile(&self, user_id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        Ok(self.lock().profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(
        &self,
        user_id: DbId,
        email: Option<String>,
    ) -> Result<Profile, sqlx::Error> {
        let mut inner = self.lock();
        let now = Utc::now();
        let profile = inner.profiles.entry(user_id).or_insert_with(|| Profile {
            user_id,
            email: None,
            full_name: None,
            company_name: None,
            avatar_url: None,
            locale: None,
            created_at: now,
            updated_at: now,
        });
        if email.is_some() {
            profile.email = email;
        }
        Ok(profile.clone())
    }

    async fn update_profile(
        &self,
        user_id: DbId,
        input: UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let mut inner = self.lock();
        let Some(profile) = inner.profiles.get_mut(&user_id) else {
            return Ok(None);
        };
        if input.full_name.is_some() {
            profile.full_name = input.full_name;
        }
        if input.company_name.is_some() {
            profile.company_name = input.company_name;
        }
        if input.locale.is_some() {
            profile.locale = input.locale;
        }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn set_avatar(
        &self,
        user_id: DbId,
        avatar_url: &str,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let mut inner = self.lock();
        let Some(profile) = inner.profiles.get_mut(&user_id) else {
            return Ok(None);
        };
        profile.avatar_url = Some(avatar_url.to_string());
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn ping(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
