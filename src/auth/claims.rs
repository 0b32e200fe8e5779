// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token claims.
//!
//! The client never holds the signing key, so tokens are decoded without
//! signature verification. The server remains the only authority on
//! validity; the client reads claims purely to schedule renewal and to
//! decide which areas the user may see.

use crate::error::ClientError;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Account role carried in the `role` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Manager,
    Staff,
}

/// Claims issued by the storefront backend in every access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (backend user primary key)
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Option<Role>,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Decode the payload of a JWT without verifying its signature or expiry.
    pub fn decode(token: &str) -> Result<Self, ClientError> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|e| ClientError::InvalidToken(e.to_string()))
    }
}
