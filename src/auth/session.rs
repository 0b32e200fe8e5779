// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session lifecycle: login, logout and signup.
//!
//! The manager wires the credential store, refresh coordinator and request
//! gateway together and owns the proactive renewal task.

use crate::auth::claims::{Claims, Role};
use crate::auth::clock::TokenClock;
use crate::auth::coordinator::{HttpRefreshBackend, RefreshBackend, RefreshCoordinator};
use crate::auth::guard::{self, Access};
use crate::auth::renewal::run_renewal_loop;
use crate::auth::storage::KeyValueStorage;
use crate::auth::store::{CachedUser, Credential, CredentialStore};
use crate::config::Config;
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, DefaultAuthorization, RequestGateway};
use crate::models::user::{LoginRequest, LogoutRequest, SignupRequest, SignupResponse, TokenPair};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Owns one user session against the storefront backend.
pub struct AuthSessionManager {
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    gateway: Arc<RequestGateway>,
    clock: TokenClock,
    renewal_task: Mutex<Option<JoinHandle<()>>>,
}

impl AuthSessionManager {
    /// Build a session manager that refreshes tokens over HTTP.
    pub fn new(config: &Config, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let backend = HttpRefreshBackend::new(&config.api_base_url, config.refresh_timeout)?;
        Self::with_refresh_backend(config, storage, Arc::new(backend))
    }

    /// Build a session manager with a custom refresh backend.
    pub fn with_refresh_backend(
        config: &Config,
        storage: Arc<dyn KeyValueStorage>,
        backend: Arc<dyn RefreshBackend>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed building http client: {e}")))?;

        let authorization = DefaultAuthorization::default();
        let store = Arc::new(CredentialStore::new(storage, authorization.clone()));
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&store),
            backend,
            config.refresh_timeout,
        ));
        let gateway = Arc::new(RequestGateway::new(
            http,
            config.api_base_url.clone(),
            authorization,
            Arc::clone(&store),
            Arc::clone(&coordinator),
        ));

        Ok(Self {
            store,
            coordinator,
            gateway,
            clock: TokenClock::new(config.refresh_lead_secs),
            renewal_task: Mutex::new(None),
        })
    }

    /// Start proactive renewal and resume a persisted session, if any.
    ///
    /// Must be called from within a Tokio runtime. Calling it again is a
    /// no-op while the renewal task is running.
    pub fn init(&self) {
        let mut task = self
            .renewal_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }

        *task = Some(tokio::spawn(run_renewal_loop(
            Arc::clone(&self.coordinator),
            self.clock,
        )));

        match self.store.get() {
            Some(credential) => {
                tracing::info!(
                    username = credential.user.as_ref().map(|u| u.username.as_str()),
                    "Restored persisted session"
                );
                self.coordinator
                    .schedule_proactive_refresh(&credential.access_token);
            }
            None => tracing::debug!("No persisted session"),
        }
    }

    /// Stop the renewal task. Stored credentials are left in place.
    pub fn dispose(&self) {
        self.coordinator.cancel_proactive_refresh();
        if let Some(handle) = self
            .renewal_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            handle.abort();
        }
    }

    /// Exchange username and password for a token pair and start a session.
    ///
    /// Nothing is stored unless the backend returns both tokens.
    pub async fn login(&self, username: &str, password: &str) -> Result<CachedUser> {
        tracing::debug!(username, "Logging in");
        let request = ApiRequest::post(endpoints::LOGIN).json(&LoginRequest::new(username, password))?;
        let pair: TokenPair = self.gateway.send_json(request).await?;

        let (Some(access), Some(refresh)) = (
            pair.access.filter(|t| !t.is_empty()),
            pair.refresh.filter(|t| !t.is_empty()),
        ) else {
            return Err(ClientError::InvalidResponse(
                "No access or refresh token received".to_string(),
            ));
        };

        let credential = Credential::from_tokens(access, refresh)?;
        self.coordinator.begin_session(&credential)?;

        let user = credential.user.unwrap_or_else(|| CachedUser {
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: None,
        });
        tracing::info!(username = %user.username, role = ?user.role, "Logged in");
        Ok(user)
    }

    /// End the session.
    ///
    /// The server is told to invalidate the refresh token on a best-effort
    /// basis; local credentials are always cleared.
    pub async fn logout(&self) {
        if let Some(refresh) = self.store.refresh_token() {
            let outcome = match ApiRequest::post(endpoints::LOGOUT).json(&LogoutRequest {
                refresh: &refresh,
            }) {
                Ok(request) => self.gateway.send_empty(request).await,
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                tracing::warn!(error = %e, "Server logout failed, clearing local session anyway");
            }
        }

        self.coordinator.end_session();
        tracing::info!("Logged out");
    }

    /// Register a new account. Does not log in.
    pub async fn signup(&self, form: &SignupRequest) -> Result<SignupResponse> {
        let request = ApiRequest::post(endpoints::SIGNUP).json(form)?;
        self.gateway.send_json(request).await
    }

    pub fn gateway(&self) -> &Arc<RequestGateway> {
        &self.gateway
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    pub fn current_user(&self) -> Option<CachedUser> {
        self.store.user()
    }

    /// Claims of the current access token.
    pub fn claims(&self) -> Option<Claims> {
        self.store.claims()
    }

    pub fn role(&self) -> Option<Role> {
        self.claims().and_then(|claims| claims.role)
    }

    /// Check access to an area requiring `required` (any signed-in user when `None`).
    pub fn authorize(&self, required: Option<Role>) -> Access {
        guard::authorize(self.is_authenticated(), self.role(), required)
    }

    /// Where the current user lands after login.
    pub fn landing_path(&self) -> Option<&'static str> {
        if !self.is_authenticated() {
            return None;
        }
        guard::landing_path(self.role())
    }
}

impl Drop for AuthSessionManager {
    fn drop(&mut self) {
        if let Some(handle) = self
            .renewal_task
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            handle.abort();
        }
    }
}
