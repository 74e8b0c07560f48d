//! Stripe client, webhook events and signature verification

pub mod client;
pub mod events;
pub mod verify;
pub mod webhooks;

pub use client::{CheckoutSessions, ClientError, StripeClient};
pub use events::{CheckoutMode, CheckoutSession, CreateSessionRequest, LineItem, VerifiedEvent};
pub use verify::{sign, verify, verify_at, VerificationError};
pub use webhooks::EventKind;
