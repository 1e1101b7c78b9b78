use std::time::Duration;

use fetch::hooks::use_property_search;
use payloads::requests::SearchProperties;
use test_helpers::spawn_app;

fn query(q: &str) -> SearchProperties {
    SearchProperties {
        q: q.into(),
        limit: Some(50),
    }
}

#[tokio::test]
async fn typing_sends_one_search() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let search =
        use_property_search(app.client.clone(), Duration::from_millis(50));
    let before = app.store.request_count();

    for q in ["s", "sh", "she", "shef"] {
        search.execute(query(q));
    }
    let state = search
        .subscribe()
        .wait_for(|s| s.success)
        .await?
        .clone();

    let found = state.data.unwrap_or_default();
    assert_eq!(found.len(), 10);
    assert!(found.iter().all(|p| p.city == "Sheffield"));
    assert_eq!(app.store.request_count(), before + 1);
    Ok(())
}

#[tokio::test]
async fn teardown_before_quiet_period_sends_nothing() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let search =
        use_property_search(app.client.clone(), Duration::from_millis(50));
    let before = app.store.request_count();

    search.execute(query("york"));
    search.teardown();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(app.store.request_count(), before);
    assert!(search.state().is_idle());
    Ok(())
}
