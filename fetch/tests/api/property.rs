use fetch::hooks::{use_create_property, use_property};
use fetch::{Outcome, StoredSession};
use payloads::PropertyId;
use std::sync::Arc;
use test_helpers::mock::new_listing;
use test_helpers::spawn_app;
use uuid::Uuid;

#[tokio::test]
async fn query_loads_and_switches_listing() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let seeded = app.store.properties();

    let property = use_property(app.client.clone(), seeded[0].id);
    property.subscribe().wait_for(|s| s.success).await?;
    assert_eq!(property.state().data.as_ref(), Some(&seeded[0]));

    assert!(property.set_deps(seeded[1].id));
    property
        .subscribe()
        .wait_for(|s| s.data.as_ref() == Some(&seeded[1]))
        .await?;
    Ok(())
}

#[tokio::test]
async fn unknown_listing_is_not_found() -> anyhow::Result<()> {
    let app = spawn_app().await;

    let property = use_property(app.client.clone(), PropertyId(Uuid::nil()));
    let state = property
        .subscribe()
        .wait_for(|s| s.error.is_some())
        .await?
        .clone();

    assert_eq!(
        state.error.as_deref(),
        Some("The requested resource was not found.")
    );
    assert_eq!(state.data, None);
    Ok(())
}

#[tokio::test]
async fn create_requires_login() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let session = Arc::new(StoredSession::new());
    session.store("not-a-real-token");
    let create = use_create_property(app.client.clone(), session.clone());

    let outcome = create.mutate(new_listing()).await;

    assert_eq!(
        outcome,
        Outcome::Failure("Session expired. Please login again.".into())
    );
    assert!(!session.is_logged_in());
    assert_eq!(session.redirected_to().as_deref(), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn create_with_token_publishes() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let session = Arc::new(StoredSession::new());
    session.store(app.login_alice().await?);
    let create = use_create_property(app.client.clone(), session.clone());

    let outcome = create.mutate(new_listing()).await;

    let created = outcome.into_data().expect("listing created");
    assert_eq!(created.title, new_listing().title);
    assert!(app.store.properties().iter().any(|p| p.id == created.id));
    assert!(session.is_logged_in());
    Ok(())
}

#[tokio::test]
async fn invalid_listing_is_never_sent() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let session = Arc::new(StoredSession::new());
    session.store(app.login_alice().await?);
    let create = use_create_property(app.client.clone(), session);
    let before = app.store.request_count();

    let mut listing = new_listing();
    listing.title = String::new();
    let outcome = create.mutate(listing).await;

    assert_eq!(outcome.error(), Some("Title is required"));
    assert_eq!(app.store.request_count(), before);
    Ok(())
}

#[tokio::test]
async fn backend_validation_uses_fixed_message() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let session = Arc::new(StoredSession::new());
    session.store(app.login_alice().await?);
    let create = use_create_property(app.client.clone(), session);

    app.store.fail_next(422, "title already taken");
    let outcome = create.mutate(new_listing()).await;

    assert_eq!(
        outcome.error(),
        Some("Validation failed. Please check your input.")
    );
    Ok(())
}
