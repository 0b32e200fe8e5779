//! Catalog models: categories, subcategories and products.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

/// Product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Subcategory within a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategory {
    pub id: u64,
    pub name: String,
    pub category: u64,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Product as listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub color: String,
    /// Decimal price as serialized by the backend (e.g. `"49.99"`)
    pub price: String,
    #[serde(default)]
    pub image_url: Value,
    /// Either `{"S": 3}` or `[{"size": "S", "quantity": 3}]`
    #[serde(default)]
    pub total_stock_by_sizes: Value,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub sizes: Value,
    pub category: u64,
    pub subcategory: u64,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub subcategory_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Product {
    /// Units in stock for `size`, accepting both stock layouts the backend
    /// has used. `None` when the size is not tracked.
    pub fn stock_for_size(&self, size: &str) -> Option<u64> {
        match &self.total_stock_by_sizes {
            Value::Object(by_size) => by_size.get(size).and_then(as_count),
            Value::Array(entries) => entries
                .iter()
                .find(|entry| entry.get("size").and_then(Value::as_str) == Some(size))
                .and_then(|entry| entry.get("quantity"))
                .and_then(as_count),
            _ => None,
        }
    }

    pub fn has_stock(&self, size: &str, quantity: u64) -> bool {
        self.stock_for_size(size)
            .is_some_and(|available| available >= quantity)
    }
}

fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Create/update body for a category.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CategoryInput {
    #[validate(custom(function = "not_blank", message = "Category name is required"))]
    pub name: String,
}

/// Create/update body for a subcategory.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SubCategoryInput {
    #[validate(custom(function = "not_blank", message = "Subcategory name is required"))]
    pub name: String,
    #[validate(required(message = "Category is required"))]
    pub category: Option<u64>,
}

/// Create/update body for a product.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ProductInput {
    #[validate(custom(function = "not_blank", message = "Product name is required"))]
    pub name: String,
    pub gender: String,
    pub color: String,
    pub price: String,
    pub image_url: Value,
    pub total_stock_by_sizes: Value,
    pub description: String,
    pub is_live: bool,
    pub sizes: Value,
    pub category: u64,
    pub subcategory: u64,
}
