use fetch::hooks::{use_properties, use_property_feed};
use fetch::{Outcome, Phase};
use payloads::requests::PropertyFilters;
use test_helpers::mock::PER_CITY;
use test_helpers::spawn_app;

#[tokio::test]
async fn pages_through_a_city() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let listings = use_properties(app.client.clone(), 4);
    let york = PropertyFilters::in_city("York");

    let outcome = listings.load_page(1, york.clone()).await;
    assert!(outcome.is_success());
    let pagination = listings.pagination();
    assert_eq!(pagination.total, PER_CITY as u64);
    assert_eq!(pagination.total_pages, 3);
    assert!(pagination.has_next);
    assert!(!pagination.has_prev);
    assert!(listings.items().iter().all(|p| p.city == "York"));

    listings.next_page(york.clone()).await;
    listings.next_page(york.clone()).await;
    assert_eq!(listings.pagination().page, 3);
    assert_eq!(listings.items().len(), 2);
    assert!(listings.next_page(york.clone()).await.is_none());

    listings.go_to_page(1, york).await;
    assert_eq!(listings.pagination().page, 1);
    Ok(())
}

#[tokio::test]
async fn filters_narrow_the_listing() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let listings = use_properties(app.client.clone(), 50);
    let filters = PropertyFilters {
        furnished: Some(true),
        min_bedrooms: Some(3),
        ..PropertyFilters::in_city("Leeds")
    };

    listings.load_page(1, filters).await;

    let items = listings.items();
    assert!(!items.is_empty());
    assert!(
        items
            .iter()
            .all(|p| p.city == "Leeds" && p.furnished && p.bedrooms >= 3)
    );
    Ok(())
}

#[tokio::test]
async fn server_error_keeps_current_page() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let listings = use_properties(app.client.clone(), 5);
    listings.load_page(1, PropertyFilters::default()).await;
    let shown = listings.items();

    app.store.fail_next(503, "maintenance");
    let outcome = listings.next_page(PropertyFilters::default()).await;

    assert_eq!(
        outcome,
        Some(Outcome::Failure(
            "Server error. Please try again later.".into()
        ))
    );
    assert_eq!(listings.items(), shown);
    assert_eq!(listings.pagination().page, 1);
    assert_eq!(listings.state().phase(), Phase::Error);
    Ok(())
}

#[tokio::test]
async fn feed_accumulates_until_exhausted() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let feed = use_property_feed(app.client.clone(), 4);
    let sheffield = PropertyFilters::in_city("Sheffield");

    while feed.load_more(sheffield.clone()).await.is_some() {}

    let state = feed.state();
    assert_eq!(state.items.len(), PER_CITY);
    assert!(!state.has_more);
    assert_eq!(state.page, 4);

    let mut ids: Vec<_> = state.items.iter().map(|p| p.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), PER_CITY);

    feed.reset();
    assert!(feed.items().is_empty());
    Ok(())
}
