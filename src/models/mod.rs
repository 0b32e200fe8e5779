// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models exchanged with the storefront backend.

pub mod cart;
pub mod collection;
pub mod inventory;
pub mod order;
pub mod user;

pub use cart::{AddToCartRequest, Cart, CartItem, CheckoutReceipt};
pub use collection::{Collection, CollectionInput};
pub use inventory::{Category, CategoryInput, Product, ProductInput, SubCategory, SubCategoryInput};
pub use order::{CheckoutData, CheckoutRequest, Order, OrderItem, OrderStatus};
pub use user::{LoginRequest, SignupRequest, SignupResponse, SignupUser, TokenPair};
