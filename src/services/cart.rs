// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shopping cart API.

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};
use crate::models::cart::{
    AddToCartRequest, Cart, CartCheckoutRequest, CartItem, CheckoutReceipt, UpdateQuantity,
};
use reqwest::StatusCode;
use std::sync::Arc;

const CART_PATH: &str = "/api/cart/";

/// Cart operations for the signed-in user.
#[derive(Clone)]
pub struct CartService {
    gateway: Arc<RequestGateway>,
}

impl CartService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    pub async fn get(&self) -> Result<Cart> {
        self.gateway.require_credential()?;
        self.gateway.send_json(ApiRequest::get(CART_PATH)).await
    }

    pub async fn add(&self, item: &AddToCartRequest) -> Result<CartItem> {
        self.gateway.require_credential()?;
        let request = ApiRequest::post(CART_PATH).json(item)?;
        self.gateway.send_json(request).await
    }

    /// Change a line's quantity. Returns `None` when the backend removed the
    /// line because the quantity dropped below one.
    pub async fn update_quantity(&self, item_id: u64, quantity: u64) -> Result<Option<CartItem>> {
        self.gateway.require_credential()?;
        let request =
            ApiRequest::patch(item_path(item_id)).json(&UpdateQuantity { quantity })?;
        let response = self.gateway.send(request).await?;

        if response.status() == StatusCode::NO_CONTENT {
            tracing::debug!(item_id, "Cart line removed by quantity update");
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    pub async fn remove(&self, item_id: u64) -> Result<()> {
        self.gateway.require_credential()?;
        self.gateway
            .send_empty(ApiRequest::delete(item_path(item_id)))
            .await
    }

    /// Check out the given lines, or the whole cart when `item_ids` is `None`.
    pub async fn checkout(&self, item_ids: Option<Vec<u64>>) -> Result<CheckoutReceipt> {
        self.gateway.require_credential()?;
        let request = ApiRequest::post(format!("{CART_PATH}checkout/"))
            .json(&CartCheckoutRequest { item_ids })?;
        self.gateway.send_json(request).await
    }

    /// Units in the cart, or zero when it cannot be loaded (e.g. signed out).
    pub async fn item_count(&self) -> u64 {
        match self.get().await {
            Ok(cart) => cart.item_count(),
            Err(e) => {
                tracing::debug!(error = %e, "Cart unavailable, reporting zero items");
                0
            }
        }
    }
}

fn item_path(item_id: u64) -> String {
    format!("{CART_PATH}items/{item_id}/")
}
