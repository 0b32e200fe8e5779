// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Proactive access token renewal.
//!
//! A [`RenewalTimer`] holds the token the next renewal is scheduled from.
//! One renewal loop per session watches it: arming replaces the pending
//! deadline, cancelling leaves the loop idle until the next arm.

use crate::auth::clock::TokenClock;
use crate::auth::coordinator::RefreshCoordinator;
use crate::time_utils::format_utc_rfc3339;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

/// Handle for arming and cancelling the renewal deadline.
pub struct RenewalTimer {
    armed: watch::Sender<Option<String>>,
}

impl Default for RenewalTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenewalTimer {
    pub fn new() -> Self {
        let (armed, _) = watch::channel(None);
        Self { armed }
    }

    /// Schedule renewal from `access_token`, replacing any pending deadline.
    pub fn arm(&self, access_token: &str) {
        self.armed.send_replace(Some(access_token.to_string()));
    }

    pub fn cancel(&self) {
        self.armed.send_replace(None);
    }

    /// Token the pending deadline was computed from.
    pub fn armed_token(&self) -> Option<String> {
        self.armed.borrow().clone()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.borrow().is_some()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.armed.subscribe()
    }
}

/// Sleep until the armed token's renewal deadline, refresh, repeat.
///
/// Runs until the task is aborted. A successful refresh re-arms the timer
/// from the new token; a failed one clears the session and disarms it.
pub(crate) async fn run_renewal_loop(coordinator: Arc<RefreshCoordinator>, clock: TokenClock) {
    let mut armed = coordinator.timer().subscribe();

    loop {
        let current = armed.borrow_and_update().clone();
        let Some(token) = current else {
            if armed.changed().await.is_err() {
                return;
            }
            continue;
        };

        let delay = clock.delay(&token);
        if let Ok(chrono_delay) = chrono::Duration::from_std(delay) {
            tracing::debug!(
                renew_at = %format_utc_rfc3339(Utc::now() + chrono_delay),
                "Access token renewal scheduled"
            );
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                match coordinator.refresh().await {
                    Ok(_) => tracing::info!("Proactive token renewal succeeded"),
                    Err(e) => tracing::warn!(error = %e, "Proactive token renewal failed"),
                }
            }
            changed = armed.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}
