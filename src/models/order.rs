//! Order and checkout models.

use super::inventory::Product;
use serde::{Deserialize, Serialize};

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Packaging,
    OnTheWay,
    Delivered,
    Returned,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Packaging => "packaging",
            OrderStatus::OnTheWay => "on_the_way",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Returned => "returned",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the order can still be cancelled by the customer.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Packaging)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub product: u64,
    #[serde(default)]
    pub product_detail: Option<Product>,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u64,
    pub price_at_purchase: String,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub user: u64,
    pub status: OrderStatus,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub first_address: String,
    #[serde(default)]
    pub second_address: Option<String>,
    #[serde(default)]
    pub is_office_address: bool,
    #[serde(default)]
    pub return_reason: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body for placing an order from the cart.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
    pub first_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_address: Option<String>,
    pub is_office_address: bool,
    /// Cart items to order; the whole cart when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_ids: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct StatusUpdate<'a> {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_reason: Option<&'a str>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckoutContact {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckoutAddresses {
    #[serde(default)]
    pub first_address: Option<String>,
    #[serde(default)]
    pub second_address: Option<String>,
    #[serde(default)]
    pub is_office_address: bool,
}

/// Prefill for the checkout form: contact details and last used addresses.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CheckoutData {
    #[serde(default)]
    pub user: CheckoutContact,
    #[serde(default)]
    pub addresses: CheckoutAddresses,
}
