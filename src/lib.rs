// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Storefront client: typed access to the storefront REST backend
//!
//! The core of the crate is the auth token lifecycle: a persisted
//! credential, single-flight token refresh shared by every request that
//! hits a `401`, at most one replay per request, and proactive renewal
//! shortly before the access token expires.

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod time_utils;

use auth::{AuthSessionManager, FileStorage, KeyValueStorage};
use config::Config;
use error::Result;
use services::{CartService, CollectionService, InventoryService, OrderService};
use std::sync::Arc;

/// A session plus the feature services bound to it.
pub struct Storefront {
    pub config: Config,
    pub session: AuthSessionManager,
    pub cart: CartService,
    pub orders: OrderService,
    pub inventory: InventoryService,
    pub collections: CollectionService,
}

impl Storefront {
    /// Build a client over `storage`. Call [`AuthSessionManager::init`] on
    /// `session` from within a runtime to start proactive renewal.
    pub fn new(config: Config, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let session = AuthSessionManager::new(&config, storage)?;
        Ok(Self::from_session(config, session))
    }

    /// Build a client persisting its credential at `config.credentials_path`.
    pub fn open(config: Config) -> Result<Self> {
        let storage = FileStorage::open(&config.credentials_path)?;
        Self::new(config, Arc::new(storage))
    }

    pub fn from_session(config: Config, session: AuthSessionManager) -> Self {
        let gateway = session.gateway();
        Self {
            cart: CartService::new(Arc::clone(gateway)),
            orders: OrderService::new(Arc::clone(gateway)),
            inventory: InventoryService::new(Arc::clone(gateway)),
            collections: CollectionService::new(Arc::clone(gateway)),
            config,
            session,
        }
    }
}
