//! HTTP routes

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod checkout;
pub mod health;
pub mod pages;
pub mod webhooks;

/// Build the router; `/webhook` is only mounted when webhooks are configured
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/", get(pages::index))
        .route("/success", get(pages::success))
        .route("/cancel", get(pages::cancel))
        .route("/health", get(health::health))
        .route("/checkout", post(checkout::create));

    if let Some(webhook) = state.config.webhook.clone() {
        let webhook_state = webhooks::WebhookState {
            app: state.clone(),
            webhook: Arc::new(webhook),
        };
        router = router.route(
            "/webhook",
            post(webhooks::receive).with_state(webhook_state),
        );
    }

    router.with_state(state)
}
