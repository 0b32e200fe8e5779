// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Order placement and tracking API.

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};
use crate::models::order::{CheckoutData, CheckoutRequest, Order, OrderStatus, StatusUpdate};
use std::sync::Arc;

const ORDERS_PATH: &str = "/api/orders/";

#[derive(Clone)]
pub struct OrderService {
    gateway: Arc<RequestGateway>,
}

impl OrderService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    /// Contact details and saved addresses used to prefill checkout.
    pub async fn checkout_data(&self) -> Result<CheckoutData> {
        self.gateway.require_credential()?;
        self.gateway
            .send_json(ApiRequest::get(format!("{ORDERS_PATH}checkout-data/")))
            .await
    }

    pub async fn checkout(&self, checkout: &CheckoutRequest) -> Result<Order> {
        self.gateway.require_credential()?;
        let request = ApiRequest::post(format!("{ORDERS_PATH}checkout/")).json(checkout)?;
        let order: Order = self.gateway.send_json(request).await?;
        tracing::info!(order_id = order.id, items = order.items.len(), "Order placed");
        Ok(order)
    }

    pub async fn mine(&self) -> Result<Vec<Order>> {
        self.gateway.require_credential()?;
        self.gateway
            .send_json(ApiRequest::get(format!("{ORDERS_PATH}mine/")))
            .await
    }

    /// Every order in the store. Admin only.
    pub async fn all(&self) -> Result<Vec<Order>> {
        self.gateway.require_credential()?;
        self.gateway
            .send_json(ApiRequest::get(format!("{ORDERS_PATH}admin-list/")))
            .await
    }

    pub async fn update_status(&self, order_id: u64, status: OrderStatus) -> Result<Order> {
        self.set_status(
            order_id,
            StatusUpdate {
                status,
                return_reason: None,
            },
        )
        .await
    }

    pub async fn cancel(&self, order_id: u64, reason: &str) -> Result<Order> {
        self.set_status(
            order_id,
            StatusUpdate {
                status: OrderStatus::Cancelled,
                return_reason: Some(reason),
            },
        )
        .await
    }

    async fn set_status(&self, order_id: u64, update: StatusUpdate<'_>) -> Result<Order> {
        self.gateway.require_credential()?;
        let request =
            ApiRequest::patch(format!("{ORDERS_PATH}{order_id}/status/")).json(&update)?;
        let order: Order = self.gateway.send_json(request).await?;
        tracing::info!(order_id, status = %order.status, "Order status updated");
        Ok(order)
    }
}
