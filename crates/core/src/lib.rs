//! Domain vocabulary for the content studio backend.
//!
//! Nothing in this crate performs I/O. It holds the shared error type, the
//! localized message catalog, and the small pure helpers (URL
//! normalization, upload policy, gallery filtering, webhook payload rules)
//! used by the database, cloud, automation and API crates.

pub mod error;
pub mod gallery;
pub mod i18n;
pub mod job;
pub mod product;
pub mod signature;
pub mod site_url;
pub mod types;
pub mod upload;
pub mod webhook;
