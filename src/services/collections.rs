// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Curated collections API.

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};
use crate::models::collection::{Collection, CollectionInput};
use std::sync::Arc;
use validator::Validate;

const COLLECTIONS_PATH: &str = "/api/inventory/collections/";

#[derive(Clone)]
pub struct CollectionService {
    gateway: Arc<RequestGateway>,
}

impl CollectionService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Collection>> {
        self.gateway
            .send_json(ApiRequest::get(COLLECTIONS_PATH))
            .await
    }

    pub async fn create(&self, input: &CollectionInput) -> Result<Collection> {
        input.validate()?;
        self.gateway.require_credential()?;
        let request = ApiRequest::post(COLLECTIONS_PATH).json(input)?;
        self.gateway.send_json(request).await
    }
}
