//! Businesses and their user links.

use adstudio_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Role of the user who first connected a business.
pub const ROLE_OWNER: &str = "owner";

/// Role of every later user linking the same business.
pub const ROLE_MEMBER: &str = "member";

/// A row from the `businesses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Business {
    pub id: DbId,
    pub url: String,
    pub name: Option<String>,
    pub created_by: DbId,
    pub detached_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A business as seen by one linked user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LinkedBusiness {
    pub id: DbId,
    pub url: String,
    pub name: Option<String>,
    pub role: String,
    pub linked_at: Timestamp,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub url: String,
    pub name: Option<String>,
    pub created_by: DbId,
}

/// Result of removing a user-business link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnlinkOutcome {
    /// True when the removed link was the last one and the business was
    /// soft-deleted.
    pub detached: bool,
    pub remaining_links: i64,
}
