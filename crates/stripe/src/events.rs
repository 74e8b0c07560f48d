//! Stripe object and event types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::webhooks::EventKind;

/// A webhook event whose signature and freshness have been checked.
///
/// There is no public constructor: the only way to get one is through
/// [`crate::verify`].
#[derive(Debug, Clone)]
pub struct VerifiedEvent {
    id: Option<String>,
    event_type: String,
    data: Value,
    created: Option<i64>,
    livemode: bool,
}

/// Event envelope as it appears on the wire
#[derive(Debug, Deserialize)]
pub(crate) struct RawEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: bool,
}

impl VerifiedEvent {
    pub(crate) fn from_raw(raw: RawEvent) -> Self {
        Self {
            id: raw.id,
            event_type: raw.event_type,
            data: raw.data,
            created: raw.created,
            livemode: raw.livemode,
        }
    }

    /// Stripe's event id, absent in hand-built deliveries
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn kind(&self) -> EventKind {
        EventKind::parse(&self.event_type)
    }

    /// The event's `data` object, untouched
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Unix timestamp at which Stripe created the event
    pub fn created(&self) -> Option<i64> {
        self.created
    }

    pub fn livemode(&self) -> bool {
        self.livemode
    }
}

/// Checkout session as returned by the Stripe API and carried in events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
}

/// Checkout session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutMode {
    Payment,
    Subscription,
    Setup,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription => "subscription",
            CheckoutMode::Setup => "setup",
        }
    }
}

/// A single line item of a checkout session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub price: String,
    pub quantity: u32,
}

/// Parameters for creating a checkout session
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    pub line_items: Vec<LineItem>,
    pub mode: CheckoutMode,
    pub success_url: String,
    pub cancel_url: String,
    pub payment_method_types: Vec<String>,
}

impl CreateSessionRequest {
    /// One unit of `price`, paid once by card
    pub fn single_payment(
        price: impl Into<String>,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            line_items: vec![LineItem {
                price: price.into(),
                quantity: 1,
            }],
            mode: CheckoutMode::Payment,
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
            payment_method_types: vec!["card".to_string()],
        }
    }

    /// Flatten into Stripe's bracketed form encoding
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("mode".to_string(), self.mode.as_str().to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
        ];

        for (i, method) in self.payment_method_types.iter().enumerate() {
            params.push((format!("payment_method_types[{}]", i), method.clone()));
        }

        for (i, item) in self.line_items.iter().enumerate() {
            params.push((format!("line_items[{}][price]", i), item.price.clone()));
            params.push((
                format!("line_items[{}][quantity]", i),
                item.quantity.to_string(),
            ));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_payment_params() {
        let req = CreateSessionRequest::single_payment(
            "price_123",
            "http://localhost:3000/success",
            "http://localhost:3000/cancel",
        );
        let params = req.form_params();
        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("success_url"), Some("http://localhost:3000/success"));
        assert_eq!(get("cancel_url"), Some("http://localhost:3000/cancel"));
        assert_eq!(get("payment_method_types[0]"), Some("card"));
        assert_eq!(get("line_items[0][price]"), Some("price_123"));
        assert_eq!(get("line_items[0][quantity]"), Some("1"));
    }

    #[test]
    fn test_checkout_session_deserialize_partial() {
        let session: CheckoutSession = serde_json::from_str(
            r#"{"id":"cs_test_1","object":"checkout.session","url":null,"payment_status":"paid"}"#,
        )
        .unwrap();
        assert_eq!(session.id, "cs_test_1");
        assert!(session.url.is_none());
        assert_eq!(session.payment_status.as_deref(), Some("paid"));
    }
}
