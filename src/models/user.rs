//! Account payloads for signup, login and logout.

use serde::{Deserialize, Serialize};

/// Login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Token pair returned by the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Logout body: the refresh token to invalidate server-side.
#[derive(Debug, Serialize)]
pub struct LogoutRequest<'a> {
    pub refresh: &'a str,
}

/// Registration form. Validation is left to the backend, which reports
/// field-level errors in the response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub password2: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Public profile echoed back on successful signup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignupUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user: SignupUser,
}
