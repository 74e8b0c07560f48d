//! Merchant-side fulfillment capability

use async_trait::async_trait;
use serde_json::Value;
use stripe::CheckoutSession;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum FulfillmentError {
    #[error("Invalid checkout session: {0}")]
    InvalidSession(#[from] serde_json::Error),
    #[error("Fulfillment failed: {0}")]
    Failed(String),
}

/// Action taken once a checkout has been paid for.
///
/// Stripe may deliver the same event more than once, so implementations
/// should be idempotent on `event_id` when one is present.
#[async_trait]
pub trait Fulfillment: Send + Sync {
    async fn fulfill(&self, event_id: Option<&str>, data: &Value)
        -> Result<(), FulfillmentError>;
}

/// Logs completed sessions and does nothing else
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFulfillment;

#[async_trait]
impl Fulfillment for LogFulfillment {
    async fn fulfill(
        &self,
        event_id: Option<&str>,
        data: &Value,
    ) -> Result<(), FulfillmentError> {
        let object = data.get("object").cloned().unwrap_or(Value::Null);
        let session: CheckoutSession = serde_json::from_value(object)?;

        info!(
            event_id,
            session_id = %session.id,
            payment_status = session.payment_status.as_deref().unwrap_or("unknown"),
            amount_total = session.amount_total,
            currency = session.currency.as_deref(),
            "Checkout session completed"
        );
        Ok(())
    }
}
