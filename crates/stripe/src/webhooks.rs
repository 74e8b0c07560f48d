//! Webhook event type parsing

/// Event type Stripe sends once a checkout session has been paid for
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Event discriminator this service reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    CheckoutSessionCompleted,
    /// Anything else, including types Stripe adds later
    Other(String),
}

impl EventKind {
    /// Classify a Stripe event type string
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            CHECKOUT_SESSION_COMPLETED => EventKind::CheckoutSessionCompleted,
            _ => EventKind::Other(event_type.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::CheckoutSessionCompleted => CHECKOUT_SESSION_COMPLETED,
            EventKind::Other(t) => t,
        }
    }
}
