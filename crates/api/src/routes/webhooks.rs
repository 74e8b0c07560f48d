//! Webhook routes

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Bytes, extract::State, http::HeaderMap};
use secrecy::ExposeSecret;
use stripe::VerificationError;
use tracing::info;

use common::config::WebhookConfig;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// State of the webhook route, which only exists when webhooks are configured
#[derive(Clone)]
pub struct WebhookState {
    pub app: Arc<AppState>,
    pub webhook: Arc<WebhookConfig>,
}

/// Receive a Stripe event. The body stays raw bytes until it has been verified.
pub async fn receive(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<&'static str> {
    let webhook = &state.webhook;

    let signature = match headers.get(webhook.signature_header.as_str()) {
        Some(value) => Some(value.to_str().map_err(|_| {
            ApiError::Verification(VerificationError::MalformedHeader(
                "header is not visible ASCII".to_string(),
            ))
        })?),
        None => None,
    };

    let event = stripe::verify(
        &body,
        signature,
        webhook.secret.expose_secret(),
        Duration::from_secs(webhook.tolerance_secs),
    )
    .map_err(ApiError::Verification)?;

    info!(
        event_id = event.id(),
        event_type = event.event_type(),
        livemode = event.livemode(),
        "Verified webhook"
    );

    state
        .app
        .event_handler
        .dispatch(&event)
        .await
        .map_err(ApiError::Dispatch)?;

    Ok("success")
}
