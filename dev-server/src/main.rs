//! Development server for frontend work against the listings API
//!
//! Runs the in-process mock backend with the seeded listings and accounts,
//! so the fetch layer and any UI on top of it can be exercised without the
//! real backend.
//!
//! Usage: cargo run -p dev-server (set PORT to pin the port)

use std::sync::Arc;

use anyhow::{Context, Result};
use fetch::telemetry;
use test_helpers::backend::{self, Store};
use test_helpers::mock::{SEED_CITIES, alice_credentials};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let subscriber = telemetry::get_subscriber("info".into());
    telemetry::init_subscriber(subscriber)?;

    let port = match std::env::var("PORT") {
        Ok(port) => port.parse().context("Invalid PORT")?,
        Err(_) => 0,
    };

    let store = Arc::new(Store::default());
    let (server, port) = backend::build("127.0.0.1", port, store.clone())?;
    tokio::spawn(async move {
        let _ = server.await.map_err(telemetry::log_error);
    });

    let alice = alice_credentials();
    info!("API: http://127.0.0.1:{port}/api");
    info!(
        "{} listings across {}",
        store.properties().len(),
        SEED_CITIES.join(", ")
    );
    info!("Login: {} / {}", alice.email, alice.password);
    info!("Frontend: BACKEND_URL=http://127.0.0.1:{port}");
    info!("Press Ctrl+C to shutdown");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down development server");
    Ok(())
}
