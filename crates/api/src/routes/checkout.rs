//! Checkout session route

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use stripe::{ClientError, CreateSessionRequest};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Open a hosted checkout session and send the buyer to it
pub async fn create(State(state): State<Arc<AppState>>) -> ApiResult<Response> {
    let request = CreateSessionRequest::single_payment(
        &state.config.price_id,
        state.config.success_url(),
        state.config.cancel_url(),
    );

    let session = state
        .checkout
        .create_session(&request)
        .await
        .map_err(ApiError::Checkout)?;

    let url = session
        .url
        .ok_or_else(|| ApiError::Checkout(ClientError::MissingUrl(session.id.clone())))?;

    info!(session_id = %session.id, "Redirecting to checkout");
    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}
