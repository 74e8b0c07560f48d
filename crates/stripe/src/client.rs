//! Stripe REST API client for creating checkout sessions

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{CheckoutSession, CreateSessionRequest};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Stripe API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Checkout session {0} has no redirect URL")]
    MissingUrl(String),
}

/// Shown to the buyer for failures that never reached Stripe's error envelope
pub const GENERIC_CHECKOUT_ERROR: &str = "Unable to start checkout. Please try again later.";

impl ClientError {
    /// Message suitable for showing to the buyer
    pub fn message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            _ => GENERIC_CHECKOUT_ERROR.to_string(),
        }
    }
}

/// Anything that can open a hosted checkout session
#[async_trait]
pub trait CheckoutSessions: Send + Sync {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CheckoutSession, ClientError>;
}

/// Stripe API client
pub struct StripeClient {
    client: reqwest::Client,
    secret_key: SecretString,
    base_url: String,
}

/// Error envelope Stripe wraps failed requests in
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: SecretString, base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::new();
        Self {
            client,
            secret_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn post_form<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .basic_auth(self.secret_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => {
                    warn!(
                        kind = envelope.error.kind.as_deref().unwrap_or("unknown"),
                        code = envelope.error.code.as_deref().unwrap_or("none"),
                        "Stripe rejected request"
                    );
                    envelope.error.message
                }
                Err(_) => None,
            }
            .or_else(|| (!text.is_empty()).then(|| text.clone()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });

            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl CheckoutSessions for StripeClient {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CheckoutSession, ClientError> {
        if request.line_items.is_empty() {
            return Err(ClientError::InvalidRequest("no line items".to_string()));
        }
        if let Some(item) = request.line_items.iter().find(|i| i.quantity == 0) {
            return Err(ClientError::InvalidRequest(format!(
                "quantity of {} must be at least 1",
                item.price
            )));
        }

        let session: CheckoutSession = self
            .post_form("/v1/checkout/sessions", &request.form_params())
            .await?;

        info!("Created checkout session {}", session.id);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LineItem;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::post,
        Form, Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// Serve `app` on an ephemeral port and return its base URL
    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: &str) -> StripeClient {
        StripeClient::new(SecretString::new("sk_test_123".to_string()), base)
    }

    fn request() -> CreateSessionRequest {
        CreateSessionRequest::single_payment(
            "price_123",
            "http://localhost:3000/success",
            "http://localhost:3000/cancel",
        )
    }

    #[tokio::test]
    async fn test_create_session() {
        async fn handler(
            headers: HeaderMap,
            Form(form): Form<HashMap<String, String>>,
        ) -> (StatusCode, Json<Value>) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if !auth.starts_with("Basic ")
                || form.get("line_items[0][price]").map(String::as_str) != Some("price_123")
                || form.get("line_items[0][quantity]").map(String::as_str) != Some("1")
                || form.get("mode").map(String::as_str) != Some("payment")
            {
                return (StatusCode::BAD_REQUEST, Json(json!({})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "id": "cs_test_1",
                    "object": "checkout.session",
                    "url": "https://pay.example/abc",
                    "status": "open",
                    "payment_status": "unpaid"
                })),
            )
        }

        let base = spawn(Router::new().route("/v1/checkout/sessions", post(handler))).await;

        let session = client(&base).create_session(&request()).await.unwrap();

        assert_eq!(session.id, "cs_test_1");
        assert_eq!(session.url.as_deref(), Some("https://pay.example/abc"));
    }

    #[tokio::test]
    async fn test_api_error_envelope() {
        async fn handler() -> (StatusCode, Json<Value>) {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": {
                        "type": "invalid_request_error",
                        "code": "resource_missing",
                        "message": "No such price: 'price_123'"
                    }
                })),
            )
        }

        let base = spawn(Router::new().route("/v1/checkout/sessions", post(handler))).await;

        let err = client(&base).create_session(&request()).await.unwrap_err();

        match &err {
            ClientError::Api { status, message } => {
                assert_eq!(*status, 400);
                assert_eq!(message, "No such price: 'price_123'");
            }
            other => panic!("expected API error, got {:?}", other),
        }
        assert_eq!(err.message(), "No such price: 'price_123'");
    }

    #[tokio::test]
    async fn test_api_error_plain_text() {
        async fn handler() -> (StatusCode, &'static str) {
            (StatusCode::BAD_GATEWAY, "upstream unavailable")
        }

        let base = spawn(Router::new().route("/v1/checkout/sessions", post(handler))).await;

        let err = client(&base).create_session(&request()).await.unwrap_err();

        assert_eq!(err.message(), "upstream unavailable");
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_locally() {
        let mut req = request();
        req.line_items = vec![LineItem {
            price: "price_123".to_string(),
            quantity: 0,
        }];

        // Nothing listens here; the request must fail before any I/O
        let err = client("http://127.0.0.1:9").create_session(&req).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_connection_error() {
        let err = client("http://127.0.0.1:9")
            .create_session(&request())
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Http(_)));
        assert_eq!(err.message(), GENERIC_CHECKOUT_ERROR);
        assert!(!err.message().contains("127.0.0.1"));
    }

    #[test]
    fn test_missing_url_message_is_generic() {
        let err = ClientError::MissingUrl("cs_test_1".to_string());
        assert!(err.to_string().contains("cs_test_1"));
        assert_eq!(err.message(), GENERIC_CHECKOUT_ERROR);
    }
}
