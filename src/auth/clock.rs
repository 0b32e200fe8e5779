// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Renewal deadlines derived from access token expiry.

use crate::auth::claims::Claims;
use crate::config::DEFAULT_REFRESH_LEAD_SECS;
use crate::time_utils::from_unix_seconds;
use chrono::{DateTime, Duration, Utc};

/// Computes when an access token should be renewed.
#[derive(Debug, Clone, Copy)]
pub struct TokenClock {
    lead: Duration,
}

impl Default for TokenClock {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_LEAD_SECS)
    }
}

impl TokenClock {
    pub fn new(lead_secs: i64) -> Self {
        Self {
            lead: Duration::seconds(lead_secs.max(0)),
        }
    }

    /// Renewal deadline for `token`: its expiry minus the lead time.
    ///
    /// An undecodable token has already "expired": the deadline is `now`.
    pub fn deadline(&self, token: &str, now: DateTime<Utc>) -> DateTime<Utc> {
        Claims::decode(token)
            .ok()
            .and_then(|claims| from_unix_seconds(claims.exp))
            .map(|expires_at| expires_at - self.lead)
            .unwrap_or(now)
    }

    /// Delay from `now` until renewal is due, clamped to zero.
    pub fn delay_at(&self, token: &str, now: DateTime<Utc>) -> std::time::Duration {
        (self.deadline(token, now) - now)
            .to_std()
            .unwrap_or(std::time::Duration::ZERO)
    }

    /// Delay from the current wall clock until renewal is due.
    pub fn delay(&self, token: &str) -> std::time::Duration {
        self.delay_at(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_expiring_at(exp: i64) -> String {
        encode(
            &Header::default(),
            &serde_json::json!({ "username": "u", "role": "user", "exp": exp }),
            &EncodingKey::from_secret(b"k"),
        )
        .unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        from_unix_seconds(seconds).unwrap()
    }

    #[test]
    fn test_delay_subtracts_lead_time() {
        let clock = TokenClock::default();
        let token = token_expiring_at(10_000 + 300);
        assert_eq!(
            clock.delay_at(&token, at(10_000)),
            std::time::Duration::from_secs(240)
        );
    }

    #[test]
    fn test_delay_clamps_inside_lead_window() {
        let clock = TokenClock::default();
        let token = token_expiring_at(10_000 + 30);
        assert_eq!(clock.delay_at(&token, at(10_000)), std::time::Duration::ZERO);

        let expired = token_expiring_at(5_000);
        assert_eq!(
            clock.delay_at(&expired, at(10_000)),
            std::time::Duration::ZERO
        );
    }

    #[test]
    fn test_undecodable_token_is_due_now() {
        let clock = TokenClock::new(60);
        let now = at(10_000);
        assert_eq!(clock.deadline("garbage", now), now);
        assert_eq!(clock.delay_at("garbage", now), std::time::Duration::ZERO);
    }

    #[test]
    fn test_custom_lead() {
        let clock = TokenClock::new(5);
        let token = token_expiring_at(10_000 + 6);
        assert_eq!(
            clock.delay_at(&token, at(10_000)),
            std::time::Duration::from_secs(1)
        );
    }
}
