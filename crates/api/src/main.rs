//! Checkout server

use std::sync::Arc;

use processor::LogFulfillment;
use stripe::StripeClient;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("api=debug".parse()?)
            .add_directive("processor=debug".parse()?)
            .add_directive("stripe=debug".parse()?),
    );
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("Starting checkout server");

    // Missing secrets stop the process here, before anything is bound
    let config = common::Config::from_env()?;

    match &config.webhook {
        Some(webhook) => info!(
            "Webhook handling enabled (header {}, tolerance {}s)",
            webhook.signature_header, webhook.tolerance_secs
        ),
        None => warn!("Webhook handling disabled (WEBHOOKS_ENABLED=false)"),
    }

    let checkout = Arc::new(StripeClient::new(
        config.stripe_secret_key.clone(),
        config.stripe_api_base.clone(),
    ));
    let state = Arc::new(AppState::new(
        config.clone(),
        checkout,
        Arc::new(LogFulfillment),
    ));

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
