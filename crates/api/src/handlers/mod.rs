//! Request handlers, one submodule per resource.
//!
//! Handlers validate input, delegate to the stores and collaborators held
//! in [`crate::state::AppState`], and map every failure through
//! [`crate::error::AppError`].

pub mod auth;
pub mod businesses;
pub mod generation;
pub mod jobs;
pub mod profile;
pub mod projects;
pub mod uploads;
