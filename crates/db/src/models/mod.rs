//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the DTOs used to create or patch it.

pub mod business;
pub mod job;
pub mod profile;
pub mod project;
