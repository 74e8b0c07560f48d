//! Application state

use std::sync::Arc;

use common::Config;
use processor::{EventHandler, Fulfillment};
use stripe::CheckoutSessions;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub checkout: Arc<dyn CheckoutSessions>,
    pub event_handler: EventHandler,
}

impl AppState {
    pub fn new(
        config: Config,
        checkout: Arc<dyn CheckoutSessions>,
        fulfillment: Arc<dyn Fulfillment>,
    ) -> Self {
        Self {
            config,
            checkout,
            event_handler: EventHandler::new(fulfillment),
        }
    }
}
