// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Feature services - thin request builders over the gateway.

pub mod cart;
pub mod collections;
pub mod inventory;
pub mod orders;

pub use cart::CartService;
pub use collections::CollectionService;
pub use inventory::InventoryService;
pub use orders::OrderService;
