// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Single-flight access token refresh.
//!
//! The coordinator is either idle or refreshing. The first caller to ask
//! for a refresh raises the flag and starts exactly one network call; every
//! caller (the first included) waits on a one-shot channel in a FIFO queue.
//! When the call settles the credential store and renewal timer are updated
//! first, then every waiter receives the same outcome in enqueue order.
//!
//! The flag is raised inside a synchronous critical section before any
//! `.await`, so concurrent callers can never start a second refresh.
//!
//! Storing a renewed token, starting a session and ending one all run under
//! a session lock together with the matching timer update, so a logout can
//! never be overwritten by a refresh that finishes at the same moment.

use crate::auth::renewal::RenewalTimer;
use crate::auth::store::{Credential, CredentialStore};
use crate::endpoints;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;

/// Tokens issued by a successful refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct RenewedTokens {
    pub access: String,
    /// Present when the backend rotates refresh tokens.
    pub refresh: Option<String>,
}

/// The network side of a refresh.
#[async_trait]
pub trait RefreshBackend: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<RenewedTokens>;
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access: Option<String>,
    refresh: Option<String>,
}

/// Calls the refresh endpoint with a dedicated client.
///
/// This client never carries an `Authorization` header and is never routed
/// through the gateway, so a failing refresh cannot recurse into another.
pub struct HttpRefreshBackend {
    http: reqwest::Client,
    url: String,
}

impl HttpRefreshBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed building refresh client: {e}")))?;

        Ok(Self {
            http,
            url: format!("{}{}", base_url.trim_end_matches('/'), endpoints::TOKEN_REFRESH),
        })
    }
}

#[async_trait]
impl RefreshBackend for HttpRefreshBackend {
    async fn refresh(&self, refresh_token: &str) -> Result<RenewedTokens> {
        let response = self
            .http
            .post(&self.url)
            .json(&RefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::RefreshRejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: RefreshResponse = response.json().await.map_err(|e| {
            ClientError::InvalidResponse(format!("Failed to parse refresh response: {}", e))
        })?;

        let access = body
            .access
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::InvalidResponse("No access token returned".to_string()))?;

        Ok(RenewedTokens {
            access,
            refresh: body.refresh.filter(|token| !token.is_empty()),
        })
    }
}

type Waiter = oneshot::Sender<Result<String>>;

/// `Some(queue)` while a refresh is in flight.
#[derive(Default)]
struct RefreshState {
    waiters: Option<VecDeque<Waiter>>,
}

/// Owns the in-flight refresh, its waiter queue and the renewal timer.
pub struct RefreshCoordinator {
    store: Arc<CredentialStore>,
    backend: Arc<dyn RefreshBackend>,
    timer: RenewalTimer,
    refresh_timeout: Duration,
    state: Mutex<RefreshState>,
    /// Held while the store and timer change together.
    session: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<CredentialStore>,
        backend: Arc<dyn RefreshBackend>,
        refresh_timeout: Duration,
    ) -> Self {
        Self {
            store,
            backend,
            timer: RenewalTimer::new(),
            refresh_timeout,
            state: Mutex::new(RefreshState::default()),
            session: Mutex::new(()),
        }
    }

    /// True while a refresh network call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.lock_state().waiters.is_some()
    }

    /// Number of callers waiting on the in-flight refresh.
    pub fn pending_waiters(&self) -> usize {
        self.lock_state()
            .waiters
            .as_ref()
            .map_or(0, |queue| queue.len())
    }

    pub fn timer(&self) -> &RenewalTimer {
        &self.timer
    }

    /// Arm the renewal timer from `access_token`, replacing any earlier deadline.
    pub fn schedule_proactive_refresh(&self, access_token: &str) {
        self.timer.arm(access_token);
    }

    pub fn cancel_proactive_refresh(&self) {
        self.timer.cancel();
    }

    /// Store a freshly issued credential and arm the timer for it.
    pub fn begin_session(&self, credential: &Credential) -> Result<()> {
        let _session = self.lock_session();
        self.store.set(credential)?;
        self.timer.arm(&credential.access_token);
        Ok(())
    }

    /// Clear credentials and disarm the timer; the user must log in again.
    pub fn end_session(&self) {
        let _session = self.lock_session();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to persist credential removal");
        }
        self.timer.cancel();
    }

    /// Obtain a new access token, starting a refresh or joining the one in
    /// flight.
    ///
    /// Fails immediately with [`ClientError::NoRefreshToken`] (and clears the
    /// local session) when no refresh token is stored.
    pub async fn refresh(self: &Arc<Self>) -> Result<String> {
        let receiver = {
            let mut state = self.lock_state();
            let (sender, receiver) = oneshot::channel();

            match state.waiters.as_mut() {
                Some(queue) => {
                    queue.push_back(sender);
                    tracing::debug!(waiters = queue.len(), "Joined in-flight token refresh");
                }
                None => {
                    let Some(refresh_token) = self.store.refresh_token() else {
                        drop(state);
                        tracing::info!("Refresh requested without a refresh token");
                        self.end_session();
                        return Err(ClientError::NoRefreshToken);
                    };

                    state.waiters = Some(VecDeque::from([sender]));
                    let driver = SettleGuard::new(Arc::clone(self));
                    tokio::spawn(driver.run(refresh_token));
                }
            }

            receiver
        };

        receiver.await.unwrap_or(Err(ClientError::RefreshAborted))
    }

    /// Run the network call and store the result. `Ok(None)` means the
    /// session was replaced (logout or a new login) while the call was in
    /// flight, so the renewed token belongs to nobody.
    async fn perform(&self, refresh_token: &str) -> Result<Option<String>> {
        let renewed = tokio::time::timeout(self.refresh_timeout, self.backend.refresh(refresh_token))
            .await
            .map_err(|_| ClientError::RefreshTimeout(self.refresh_timeout))??;

        let _session = self.lock_session();
        if !self
            .store
            .renew_if_current(refresh_token, &renewed.access, renewed.refresh.as_deref())?
        {
            tracing::info!("Session changed during token refresh, discarding renewed token");
            return Ok(None);
        }
        self.timer.arm(&renewed.access);
        Ok(Some(renewed.access))
    }

    /// Lower the flag and hand `outcome` to every waiter, oldest first.
    fn settle(&self, outcome: Result<String>) {
        let waiters = self.lock_state().waiters.take().unwrap_or_default();

        match &outcome {
            Ok(_) => tracing::info!(waiters = waiters.len(), "Access token refreshed"),
            Err(e) => {
                tracing::warn!(waiters = waiters.len(), error = %e, "Access token refresh failed")
            }
        }

        for waiter in waiters {
            // A waiter whose caller went away is simply skipped.
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, ()> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_state(&self) -> MutexGuard<'_, RefreshState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Drives one refresh to completion on its own task.
///
/// If the task is dropped before settling (runtime shutdown, panic in the
/// backend) the waiters are released with [`ClientError::RefreshAborted`]
/// instead of hanging. Stored credentials are left alone.
struct SettleGuard {
    coordinator: Arc<RefreshCoordinator>,
    settled: bool,
}

impl SettleGuard {
    fn new(coordinator: Arc<RefreshCoordinator>) -> Self {
        Self {
            coordinator,
            settled: false,
        }
    }

    async fn run(mut self, refresh_token: String) {
        tracing::debug!("Starting token refresh");
        let outcome = match self.coordinator.perform(&refresh_token).await {
            Ok(Some(access_token)) => Ok(access_token),
            Ok(None) => Err(ClientError::RefreshAborted),
            Err(e) => {
                self.coordinator.end_session();
                Err(e)
            }
        };
        self.settled = true;
        self.coordinator.settle(outcome);
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(Err(ClientError::RefreshAborted));
        }
    }
}
