//! Dispatch of verified webhook events to fulfillment

pub mod fulfillment;
pub mod handler;

pub use fulfillment::{Fulfillment, FulfillmentError, LogFulfillment};
pub use handler::{DispatchError, EventHandler};
