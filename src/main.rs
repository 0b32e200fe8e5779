// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storefront command-line client
//!
//! Restores (or starts) a session against the storefront backend and
//! prints a catalog and cart summary.

use anyhow::Context;
use storefront_client::{config::Config, Storefront};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(api = %config.api_base_url, "Starting storefront client");

    let client = Storefront::open(config).context("Failed to open credential store")?;
    client.session.init();

    if !client.session.is_authenticated() {
        let username = std::env::var("STOREFRONT_USERNAME")
            .context("No stored session and STOREFRONT_USERNAME is not set")?;
        let password = std::env::var("STOREFRONT_PASSWORD")
            .context("No stored session and STOREFRONT_PASSWORD is not set")?;
        client
            .session
            .login(&username, &password)
            .await
            .context("Login failed")?;
    }

    if let Some(user) = client.session.current_user() {
        tracing::info!(
            username = %user.username,
            landing = client.session.landing_path().unwrap_or("/"),
            "Signed in"
        );
    }

    let products = client
        .inventory
        .products()
        .await
        .context("Failed to list products")?;
    let live = products.iter().filter(|p| p.is_live).count();
    tracing::info!(total = products.len(), live, "Catalog loaded");

    let items = client.cart.item_count().await;
    tracing::info!(items, "Cart summary");

    client.session.dispose();
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("storefront_client=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
