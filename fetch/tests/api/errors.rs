use std::sync::Arc;
use std::time::Duration;

use fetch::Outcome;
use fetch::envelope::{EnvelopeOptions, RequestEnvelope};
use fetch::error::{NETWORK_MESSAGE, TIMEOUT_MESSAGE};
use fetch::hooks::use_properties;
use payloads::requests::{PropertyFilters, SearchProperties};
use test_helpers::{spawn_app, unreachable_client};

fn search_envelope(
    client: Arc<payloads::APIClient>,
) -> RequestEnvelope<(), Vec<payloads::Property>> {
    RequestEnvelope::with_options(
        move |()| {
            let client = client.clone();
            async move {
                let search = SearchProperties {
                    q: "leeds".into(),
                    limit: None,
                };
                client.search_properties(&search).await
            }
        },
        EnvelopeOptions::new().action("search properties"),
    )
}

#[tokio::test]
async fn slow_backend_times_out() -> anyhow::Result<()> {
    let app = spawn_app().await;
    app.store.set_delay(Some(Duration::from_millis(500)));
    let client = Arc::new(app.client_with_timeout(Duration::from_millis(50))?);

    let outcome = search_envelope(client).execute(()).await;

    assert_eq!(outcome, Outcome::Failure(TIMEOUT_MESSAGE.into()));
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() -> anyhow::Result<()> {
    let client = Arc::new(unreachable_client());

    let envelope = search_envelope(client);
    let outcome = envelope.execute(()).await;

    assert_eq!(outcome, Outcome::Failure(NETWORK_MESSAGE.into()));
    assert_eq!(envelope.state().error.as_deref(), Some(NETWORK_MESSAGE));
    Ok(())
}

#[tokio::test]
async fn other_statuses_surface_backend_message() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let listings = use_properties(app.client.clone(), 10);

    app.store.fail_next(409, "Listing is being edited");
    let outcome = listings.load_page(1, PropertyFilters::default()).await;

    assert_eq!(outcome, Outcome::Failure("Listing is being edited".into()));
    Ok(())
}

#[tokio::test]
async fn bad_page_uses_backend_message() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let listings = use_properties(app.client.clone(), 10);

    let outcome = listings.load_page(0, PropertyFilters::default()).await;

    assert_eq!(outcome.error(), Some("page and limit must be at least 1"));
    Ok(())
}
