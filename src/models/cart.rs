//! Shopping cart models.

use super::inventory::Product;
use serde::{Deserialize, Serialize};

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u64,
    pub product: u64,
    #[serde(default)]
    pub product_detail: Option<Product>,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u64,
    /// Unit price captured when the item was added
    pub price_at_add: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// The authenticated user's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: u64,
    pub user: u64,
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Cart {
    /// Total number of units across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddToCartRequest {
    pub product: u64,
    pub size: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct UpdateQuantity {
    pub quantity: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct CartCheckoutRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_ids: Option<Vec<u64>>,
}

/// Acknowledgement returned by cart checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutReceipt {
    #[serde(default)]
    pub detail: String,
}
