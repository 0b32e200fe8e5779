// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Catalog API: categories, subcategories and products.
//!
//! Reads are public. Writes need a signed-in (admin) user and are
//! validated locally before anything is sent.

use crate::error::Result;
use crate::gateway::{ApiRequest, RequestGateway};
use crate::models::inventory::{
    Category, CategoryInput, Product, ProductInput, SubCategory, SubCategoryInput,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

const CATEGORIES_PATH: &str = "/api/inventory/categories/";
const SUBCATEGORIES_PATH: &str = "/api/inventory/subcategories/";
const PRODUCTS_PATH: &str = "/api/inventory/products/";

#[derive(Clone)]
pub struct InventoryService {
    gateway: Arc<RequestGateway>,
}

impl InventoryService {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    // Categories

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.list(CATEGORIES_PATH.to_string()).await
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category> {
        input.validate()?;
        self.create(CATEGORIES_PATH, input).await
    }

    pub async fn update_category(&self, id: u64, input: &CategoryInput) -> Result<Category> {
        self.update(CATEGORIES_PATH, id, input).await
    }

    pub async fn delete_category(&self, id: u64) -> Result<()> {
        self.delete(CATEGORIES_PATH, id).await
    }

    // Subcategories

    pub async fn subcategories(&self) -> Result<Vec<SubCategory>> {
        self.list(SUBCATEGORIES_PATH.to_string()).await
    }

    pub async fn subcategories_by_category(&self, category_id: u64) -> Result<Vec<SubCategory>> {
        self.list(format!("{CATEGORIES_PATH}{category_id}/subcategories/"))
            .await
    }

    pub async fn create_subcategory(&self, input: &SubCategoryInput) -> Result<SubCategory> {
        input.validate()?;
        self.create(SUBCATEGORIES_PATH, input).await
    }

    pub async fn update_subcategory(
        &self,
        id: u64,
        input: &SubCategoryInput,
    ) -> Result<SubCategory> {
        self.update(SUBCATEGORIES_PATH, id, input).await
    }

    pub async fn delete_subcategory(&self, id: u64) -> Result<()> {
        self.delete(SUBCATEGORIES_PATH, id).await
    }

    // Products

    pub async fn products(&self) -> Result<Vec<Product>> {
        self.list(PRODUCTS_PATH.to_string()).await
    }

    pub async fn products_by_category(&self, category_id: u64) -> Result<Vec<Product>> {
        self.list(format!("{CATEGORIES_PATH}{category_id}/products/"))
            .await
    }

    pub async fn products_by_subcategory(&self, subcategory_id: u64) -> Result<Vec<Product>> {
        self.list(format!("{SUBCATEGORIES_PATH}{subcategory_id}/products/"))
            .await
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Product> {
        input.validate()?;
        self.create(PRODUCTS_PATH, input).await
    }

    pub async fn update_product(&self, id: u64, input: &ProductInput) -> Result<Product> {
        self.update(PRODUCTS_PATH, id, input).await
    }

    pub async fn delete_product(&self, id: u64) -> Result<()> {
        self.delete(PRODUCTS_PATH, id).await
    }

    async fn list<T: DeserializeOwned>(&self, path: String) -> Result<Vec<T>> {
        self.gateway.send_json(ApiRequest::get(path)).await
    }

    async fn create<B, T>(&self, collection: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.gateway.require_credential()?;
        let request = ApiRequest::post(collection).json(body)?;
        self.gateway.send_json(request).await
    }

    async fn update<B, T>(&self, collection: &str, id: u64, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.gateway.require_credential()?;
        let request = ApiRequest::put(format!("{collection}{id}/")).json(body)?;
        self.gateway.send_json(request).await
    }

    async fn delete(&self, collection: &str, id: u64) -> Result<()> {
        self.gateway.require_credential()?;
        self.gateway
            .send_empty(ApiRequest::delete(format!("{collection}{id}/")))
            .await
    }
}
