//! Postgres repositories, one zero-sized struct per table.
//!
//! Every method takes the pool explicitly and returns `sqlx::Error`.

pub mod business_repo;
pub mod job_repo;
pub mod profile_repo;
pub mod project_repo;

pub use business_repo::BusinessRepo;
pub use job_repo::JobRepo;
pub use profile_repo::ProfileRepo;
pub use project_repo::ProjectRepo;
