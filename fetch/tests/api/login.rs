use std::sync::Arc;

use fetch::StoredSession;
use fetch::hooks::use_login;
use fetch::rate_limit::MAX_ATTEMPTS;
use fetch::time::TimeSource;
use payloads::requests::LoginCredentials;
use test_helpers::mock::alice_credentials;
use test_helpers::spawn_app;

fn clock() -> TimeSource {
    TimeSource::new("2025-06-01T12:00:00Z".parse().unwrap())
}

#[tokio::test]
async fn login_stores_token() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let session = Arc::new(StoredSession::new());
    let auth = use_login(app.client.clone(), session.clone(), clock());

    let outcome = auth.login(alice_credentials()).await;

    let logged_in = outcome.into_data().expect("login succeeds");
    assert_eq!(session.token(), Some(logged_in.token));
    assert_eq!(logged_in.user.email, alice_credentials().email);
    Ok(())
}

#[tokio::test]
async fn repeated_failures_lock_login() -> anyhow::Result<()> {
    let app = spawn_app().await;
    let session = Arc::new(StoredSession::new());
    let time_source = clock();
    let auth = use_login(app.client.clone(), session.clone(), time_source);
    let wrong = LoginCredentials {
        password: "guess".into(),
        ..alice_credentials()
    };

    for _ in 0..MAX_ATTEMPTS {
        let outcome = auth.login(wrong.clone()).await;
        assert_eq!(outcome.error(), Some("Invalid email or password"));
    }
    let before = app.store.request_count();
    let outcome = auth.login(alice_credentials()).await;

    assert!(
        outcome
            .error()
            .is_some_and(|e| e.starts_with("Too many login attempts"))
    );
    assert_eq!(app.store.request_count(), before);
    assert!(!session.is_logged_in());
    Ok(())
}
