//! Managed-backend collaborators: object storage, the hosted identity
//! provider, and bounded remote fetches.

pub mod fetch;
pub mod identity;
pub mod storage;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use fetch::{FetchConfig, FetchError, RemoteFetcher, RemoteFile};
pub use identity::{AuthSession, GoTrueClient, GoTrueConfig, IdentityError, IdentityProvider, SessionUser};
pub use storage::{ObjectStorage, S3Storage, StorageConfig, StorageError, StoredObject};
