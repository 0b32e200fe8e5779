// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth endpoint paths on the storefront backend.

pub const SIGNUP: &str = "/api/user/signup/";
pub const LOGIN: &str = "/api/user/login/";
pub const LOGOUT: &str = "/api/user/logout/";
pub const TOKEN_REFRESH: &str = "/api/token/refresh/";

const AUTH_ENDPOINTS: [&str; 4] = [SIGNUP, LOGIN, LOGOUT, TOKEN_REFRESH];

/// True for endpoints whose 401 must never trigger refresh-and-retry:
/// retrying them is either meaningless or recursive.
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    AUTH_ENDPOINTS
        .iter()
        .any(|endpoint| path.contains(endpoint.trim_end_matches('/')))
}
