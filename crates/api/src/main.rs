//! Pronto API - Order-taking backend for Pronto Pizza.
//!
//! This binary serves the JSON API on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework over a file-backed entity store (one JSON file per
//!   entity, one directory per collection)
//! - Stripe for payment charges, Mailgun for receipt emails
//! - Token-based authentication: a bearer token id in the `token` header,
//!   cross-checked against the email named in the request
//!
//! # Consistency
//!
//! The store has no cross-entity atomicity and no per-entity locking; the
//! deployment assumption is a single node with low contention. See
//! DESIGN.md for the documented windows.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use axum::{Router, routing::get};
use rust_decimal::Decimal;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod error;
mod gateways;
mod models;
mod routes;
mod services;
mod state;
mod store;

use config::Config;
use gateways::{MailgunGateway, StripeGateway};
use models::{MENU_ID, Menu};
use state::AppState;
use store::{Collection, EntityStore, StoreError};

#[tokio::main]
async fn main() {
    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");

    // Initialize tracing with EnvFilter
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pronto_api=info,tower_http=debug".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Initialize the entity store and make sure the menu exists
    let store = EntityStore::new(&config.data_dir);
    store.init().await.expect("Failed to initialize data directory");
    seed_menu(&store).await.expect("Failed to seed menu");
    tracing::info!(data_dir = %config.data_dir.display(), "entity store ready");

    // Build the gateways
    let payments =
        Arc::new(StripeGateway::new(config.stripe.clone()).expect("Failed to build Stripe client"));
    let notifications = Arc::new(
        MailgunGateway::new(config.mailgun.clone()).expect("Failed to build Mailgun client"),
    );

    // Build application state
    let state = AppState::new(config.clone(), payments, notifications);

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .merge(routes::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("api listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Write the default menu on first boot. An existing menu is left alone;
/// the workflows treat it as read-only.
async fn seed_menu(store: &EntityStore) -> Result<(), StoreError> {
    match store.read::<Menu>(Collection::Menus, MENU_ID).await {
        Ok(_) => Ok(()),
        Err(StoreError::NotFound) => {
            let menu: Menu = [
                ("margherita", Decimal::new(1499, 2)),
                ("pepperoni", Decimal::new(1699, 2)),
                ("hawaiian", Decimal::new(1599, 2)),
                ("meatlovers", Decimal::new(1899, 2)),
                ("garlic bread", Decimal::new(699, 2)),
                ("soda", Decimal::new(349, 2)),
            ]
            .into_iter()
            .map(|(name, price)| (name.to_owned(), price))
            .collect();
            store.create(Collection::Menus, MENU_ID, &menu).await?;
            tracing::info!("seeded default menu");
            Ok(())
        }
        Err(other) => Err(other),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
