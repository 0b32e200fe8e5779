//! Curated product collections.

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: u64,
    pub name: String,
    #[serde(default, rename = "isLive")]
    pub is_live: bool,
    /// Product ids in display order
    #[serde(default)]
    pub products: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CollectionInput {
    #[validate(length(min = 1, message = "Collection name is required"))]
    pub name: String,
    #[serde(rename = "isLive")]
    pub is_live: bool,
    pub products: Vec<u64>,
}
