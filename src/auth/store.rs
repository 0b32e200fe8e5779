// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential store: the persisted access/refresh token pair and cached user.

use crate::auth::claims::{Claims, Role};
use crate::auth::storage::KeyValueStorage;
use crate::error::{ClientError, Result};
use crate::gateway::DefaultAuthorization;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

const ALL_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// User details cached next to the tokens for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedUser {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
}

impl From<&Claims> for CachedUser {
    fn from(claims: &Claims) -> Self {
        Self {
            username: claims.username.clone(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
            role: claims.role,
        }
    }
}

/// A complete credential. Both tokens are always present together.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Option<CachedUser>,
}

impl Credential {
    /// Build a credential from a freshly issued token pair, caching the
    /// user details decoded from the access token.
    pub fn from_tokens(access_token: String, refresh_token: String) -> Result<Self> {
        let claims = Claims::decode(&access_token)?;
        Ok(Self {
            access_token,
            refresh_token,
            user: Some(CachedUser::from(&claims)),
        })
    }
}

/// Owns the persisted credential and keeps the gateway's default
/// `Authorization` header in step with it.
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStorage>,
    authorization: DefaultAuthorization,
    /// Decoded claims keyed by the token they were decoded from.
    claims_cache: RwLock<Option<(String, Claims)>>,
    /// Serializes writes so a renewal cannot interleave with `set` or `clear`.
    write_lock: Mutex<()>,
}

impl CredentialStore {
    /// Wrap `storage`, priming the default header from any persisted credential.
    pub fn new(storage: Arc<dyn KeyValueStorage>, authorization: DefaultAuthorization) -> Self {
        let store = Self {
            storage,
            authorization,
            claims_cache: RwLock::new(None),
            write_lock: Mutex::new(()),
        };

        match store.get() {
            Some(credential) => {
                tracing::debug!("Restored persisted credential");
                store.authorization.set_bearer(&credential.access_token);
            }
            None => store.authorization.clear(),
        }

        store
    }

    /// The stored credential, or `None` when absent or only partially present.
    pub fn get(&self) -> Option<Credential> {
        let access_token = self.read(ACCESS_TOKEN_KEY)?;
        let refresh_token = self.read(REFRESH_TOKEN_KEY)?;
        let user = self
            .read(USER_KEY)
            .and_then(|json| serde_json::from_str(&json).ok());

        Some(Credential {
            access_token,
            refresh_token,
            user,
        })
    }

    /// Store a full credential atomically.
    pub fn set(&self, credential: &Credential) -> Result<()> {
        let user_json = credential
            .user
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        let mut entries = vec![
            (ACCESS_TOKEN_KEY, credential.access_token.as_str()),
            (REFRESH_TOKEN_KEY, credential.refresh_token.as_str()),
        ];
        if let Some(json) = user_json.as_deref() {
            entries.push((USER_KEY, json));
        }

        let _writing = self.lock_writes();
        let written = self.storage.set_many(&entries).and_then(|_| {
            if user_json.is_none() {
                self.storage.remove_many(&[USER_KEY])
            } else {
                Ok(())
            }
        });

        if let Err(e) = written {
            // Never leave half a credential behind.
            let _ = self.clear_locked();
            return Err(e);
        }

        self.authorization.set_bearer(&credential.access_token);
        Ok(())
    }

    /// Replace the access token after a successful refresh, but only while
    /// `expected_refresh` is still the stored refresh token. A rotated
    /// refresh token, when the backend issues one, replaces the old one.
    ///
    /// Returns `false` without writing when the session was cleared or
    /// replaced. The check and the write happen under the store's write
    /// lock, so a concurrent `clear` lands either before (renewal skipped)
    /// or after (renewal undone).
    pub fn renew_if_current(
        &self,
        expected_refresh: &str,
        access_token: &str,
        rotated_refresh: Option<&str>,
    ) -> Result<bool> {
        let user_json = Claims::decode(access_token)
            .ok()
            .map(|claims| serde_json::to_string(&CachedUser::from(&claims)))
            .transpose()
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        let _writing = self.lock_writes();
        if self.get().map(|credential| credential.refresh_token).as_deref()
            != Some(expected_refresh)
        {
            return Ok(false);
        }

        let mut entries = vec![(ACCESS_TOKEN_KEY, access_token)];
        if let Some(refresh) = rotated_refresh {
            entries.push((REFRESH_TOKEN_KEY, refresh));
        }
        if let Some(json) = user_json.as_deref() {
            entries.push((USER_KEY, json));
        }

        self.storage.set_many(&entries)?;
        self.authorization.set_bearer(access_token);
        Ok(true)
    }

    /// Remove the credential and the default header.
    ///
    /// The header and claims cache are cleared even if persisting the
    /// removal fails.
    pub fn clear(&self) -> Result<()> {
        let _writing = self.lock_writes();
        self.clear_locked()
    }

    fn clear_locked(&self) -> Result<()> {
        self.authorization.clear();
        *self
            .claims_cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        self.storage.remove_many(&ALL_KEYS)
    }

    pub fn access_token(&self) -> Option<String> {
        self.get().map(|credential| credential.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get().map(|credential| credential.refresh_token)
    }

    pub fn user(&self) -> Option<CachedUser> {
        self.get().and_then(|credential| credential.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    /// Claims of the current access token, decoded once per token.
    pub fn claims(&self) -> Option<Claims> {
        let token = self.access_token()?;

        if let Some((cached_token, claims)) = self
            .claims_cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            if *cached_token == token {
                return Some(claims.clone());
            }
        }

        let claims = match Claims::decode(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(error = %e, "Stored access token could not be decoded");
                return None;
            }
        };

        *self
            .claims_cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some((token, claims.clone()));
        Some(claims)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Credential storage read failed");
                None
            }
        }
    }
}
