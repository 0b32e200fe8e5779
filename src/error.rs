// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types shared by the auth core and the feature services.

use std::time::Duration;

/// Errors surfaced by the storefront client.
///
/// The type is `Clone` because a single refresh outcome is delivered to
/// every request queued behind it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    #[error("No refresh token available; log in again")]
    NoRefreshToken,

    #[error("Token refresh rejected: HTTP {status}: {body}")]
    RefreshRejected { status: u16, body: String },

    #[error("Token refresh timed out after {0:?}")]
    RefreshTimeout(Duration),

    #[error("Token refresh was abandoned before it settled")]
    RefreshAborted,

    #[error("Unauthorized response from auth endpoint {path}: {body}")]
    UnauthorizedEndpoint { path: String, body: String },

    #[error("Request to {0} was still unauthorized after retry")]
    AlreadyRetried(String),

    #[error("No authentication token found. Please log in.")]
    NotAuthenticated,

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Credential storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// True when the error means the session is gone and the user must
    /// log in again.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ClientError::NoRefreshToken
                | ClientError::RefreshRejected { .. }
                | ClientError::RefreshTimeout(_)
                | ClientError::RefreshAborted
                | ClientError::AlreadyRetried(_)
                | ClientError::NotAuthenticated
        )
    }

    /// HTTP status carried by the error, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::RefreshRejected { status, .. } | ClientError::Api { status, .. } => {
                Some(*status)
            }
            ClientError::UnauthorizedEndpoint { .. } | ClientError::AlreadyRetried(_) => Some(401),
            _ => None,
        }
    }

    /// Parse the server's error body as JSON (field-level validation errors).
    pub fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            ClientError::Api { body, .. }
            | ClientError::RefreshRejected { body, .. }
            | ClientError::UnauthorizedEndpoint { body, .. } => {
                serde_json::from_str(body).ok()
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(errors.to_string())
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
