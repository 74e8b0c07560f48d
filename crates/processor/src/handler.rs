//! Webhook event handler

use std::sync::Arc;

use stripe::{EventKind, VerifiedEvent};
use thiserror::Error;
use tracing::{debug, info};

use crate::fulfillment::{Fulfillment, FulfillmentError};

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Fulfillment failed: {source}")]
    Fulfillment {
        event_id: Option<String>,
        #[source]
        source: FulfillmentError,
    },
}

/// Routes verified events to the fulfillment capability
#[derive(Clone)]
pub struct EventHandler {
    fulfillment: Arc<dyn Fulfillment>,
}

impl EventHandler {
    pub fn new(fulfillment: Arc<dyn Fulfillment>) -> Self {
        Self { fulfillment }
    }

    /// Process a verified event.
    ///
    /// Unrecognized types succeed without doing anything.
    pub async fn dispatch(&self, event: &VerifiedEvent) -> Result<(), DispatchError> {
        match event.kind() {
            EventKind::CheckoutSessionCompleted => {
                info!(event_id = event.id(), "Fulfilling completed checkout");
                self.fulfillment
                    .fulfill(event.id(), event.data())
                    .await
                    .map_err(|source| DispatchError::Fulfillment {
                        event_id: event.id().map(str::to_string),
                        source,
                    })
            }
            EventKind::Other(event_type) => {
                debug!(event_id = event.id(), "Ignoring event type: {}", event_type);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    const SECRET: &str = "whsec_test";

    #[derive(Default)]
    struct Recorder {
        calls: AtomicUsize,
        seen: Mutex<Vec<(Option<String>, Value)>>,
        fail: bool,
    }

    #[async_trait]
    impl Fulfillment for Recorder {
        async fn fulfill(
            &self,
            event_id: Option<&str>,
            data: &Value,
        ) -> Result<(), FulfillmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((event_id.map(str::to_string), data.clone()));
            if self.fail {
                return Err(FulfillmentError::Failed("warehouse offline".to_string()));
            }
            Ok(())
        }
    }

    fn event(event_type: &str) -> VerifiedEvent {
        let body = serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": event_type,
            "data": { "object": { "id": "cs_test_1" } }
        }))
        .unwrap();
        let now = chrono::Utc::now().timestamp();
        let header = stripe::sign(&body, SECRET, now);
        stripe::verify(&body, Some(&header), SECRET, Duration::from_secs(300)).unwrap()
    }

    #[tokio::test]
    async fn test_checkout_completed_invokes_fulfillment_once() {
        let recorder = Arc::new(Recorder::default());
        let handler = EventHandler::new(recorder.clone());

        handler
            .dispatch(&event("checkout.session.completed"))
            .await
            .unwrap();

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].0.as_deref(), Some("evt_1"));
        assert_eq!(seen[0].1, json!({ "object": { "id": "cs_test_1" } }));
    }

    #[tokio::test]
    async fn test_minimal_completed_event_reaches_fulfillment() {
        let recorder = Arc::new(Recorder::default());
        let handler = EventHandler::new(recorder.clone());
        let body = br#"{"type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#;
        let header = stripe::sign(body, SECRET, chrono::Utc::now().timestamp());

        let event =
            stripe::verify(body, Some(&header), SECRET, Duration::from_secs(300)).unwrap();
        handler.dispatch(&event).await.unwrap();

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].0, None);
        assert_eq!(seen[0].1, json!({ "object": { "id": "cs_1" } }));
    }

    #[tokio::test]
    async fn test_other_types_are_ignored() {
        let recorder = Arc::new(Recorder::default());
        let handler = EventHandler::new(recorder.clone());

        for event_type in [
            "payment_intent.succeeded",
            "checkout.session.expired",
            "some.future.event",
        ] {
            handler.dispatch(&event(event_type)).await.unwrap();
        }

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fulfillment_error_propagates() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Default::default()
        });
        let handler = EventHandler::new(recorder.clone());

        let err = handler
            .dispatch(&event("checkout.session.completed"))
            .await
            .unwrap_err();

        let DispatchError::Fulfillment { event_id, source } = err;
        assert_eq!(event_id.as_deref(), Some("evt_1"));
        assert!(matches!(source, FulfillmentError::Failed(_)));
    }

    #[tokio::test]
    async fn test_duplicate_delivery_dispatches_again() {
        let recorder = Arc::new(Recorder::default());
        let handler = EventHandler::new(recorder.clone());
        let event = event("checkout.session.completed");

        handler.dispatch(&event).await.unwrap();
        handler.dispatch(&event).await.unwrap();

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 2);
    }
}
