// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Role-based access checks for protected areas of the storefront.

use crate::auth::claims::Role;

/// Where unauthenticated or unauthorized users are sent.
pub const HOME_PATH: &str = "/";
pub const ADMIN_PATH: &str = "/admin";
pub const PROFILE_PATH: &str = "/profile";

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied { redirect_to: &'static str },
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }
}

/// Decide whether a user may enter an area.
///
/// `role` is `None` when the token carries no recognised role. Without a
/// credential access is always denied; with one, `required` must match
/// exactly when given.
pub fn authorize(authenticated: bool, role: Option<Role>, required: Option<Role>) -> Access {
    if !authenticated {
        return Access::Denied {
            redirect_to: HOME_PATH,
        };
    }

    match required {
        Some(required) if role != Some(required) => Access::Denied {
            redirect_to: HOME_PATH,
        },
        _ => Access::Allowed,
    }
}

/// Landing page after login for roles that have one.
pub fn landing_path(role: Option<Role>) -> Option<&'static str> {
    match role? {
        Role::Admin => Some(ADMIN_PATH),
        Role::User => Some(PROFILE_PATH),
        Role::Manager | Role::Staff => None,
    }
}
