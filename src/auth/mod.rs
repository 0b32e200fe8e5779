// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication: credential storage, token refresh and session lifecycle.

pub mod claims;
pub mod clock;
pub mod coordinator;
pub mod guard;
pub mod renewal;
pub mod session;
pub mod storage;
pub mod store;

pub use claims::{Claims, Role};
pub use clock::TokenClock;
pub use coordinator::{HttpRefreshBackend, RefreshBackend, RefreshCoordinator, RenewedTokens};
pub use guard::{authorize, landing_path, Access};
pub use renewal::RenewalTimer;
pub use session::AuthSessionManager;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::{CachedUser, Credential, CredentialStore};
