//! In-process stand-ins for the managed backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::identity::{AuthSession, IdentityError, IdentityProvider, SessionUser};
use crate::storage::{public_url, ObjectStorage, StorageError, StoredObject};

/// Stores objects in a map and serves them under a fake CDN prefix.
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryStorage {
    pub const BASE_URL: &'static str = "https://storage.test/media";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let objects = self.objects.lock().unwrap_or_else(|p| p.into_inner());
        let mut keys: Vec<String> = objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = bytes.len() as u64;
        self.objects
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(StoredObject {
            key: key.to_string(),
            public_url: public_url(Self::BASE_URL, key),
            size,
            content_type: content_type.to_string(),
        })
    }
}

/// Accepts one email/password pair and one auth code.
pub struct StaticIdentityProvider {
    pub email: String,
    pub password: String,
    pub code: String,
    pub session: AuthSession,
    signed_out: Mutex<Vec<String>>,
}

impl StaticIdentityProvider {
    pub fn new(email: &str, password: &str, code: &str, user_id: uuid::Uuid) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            code: code.to_string(),
            session: AuthSession {
                access_token: format!("access-{user_id}"),
                refresh_token: format!("refresh-{user_id}"),
                expires_in: 3600,
                user: SessionUser {
                    id: user_id,
                    email: Some(email.to_string()),
                },
            },
            signed_out: Mutex::new(Vec::new()),
        }
    }

    /// Access tokens passed to [`IdentityProvider::sign_out`].
    pub fn signed_out(&self) -> Vec<String> {
        self.signed_out.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, IdentityError> {
        if email == self.email && password == self.password {
            Ok(self.session.clone())
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }

    async fn exchange_code(
        &self,
        code: &str,
        _code_verifier: Option<&str>,
    ) -> Result<AuthSession, IdentityError> {
        if code == self.code {
            Ok(self.session.clone())
        } else {
            Err(IdentityError::InvalidCredentials)
        }
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.signed_out
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(access_token.to_string());
        Ok(())
    }
}
