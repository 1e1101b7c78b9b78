use std::sync::Arc;

use payloads::APIClient;
use payloads::requests::LoginCredentials;

use crate::auth::Authenticator;
use crate::rate_limit::LoginRateLimiter;
use crate::session::StoredSession;
use crate::time::TimeSource;

pub fn use_login(
    client: Arc<APIClient>,
    session: Arc<StoredSession>,
    time_source: TimeSource,
) -> Authenticator {
    Authenticator::new(
        move |credentials: LoginCredentials| {
            let client = client.clone();
            async move { client.login(&credentials).await }
        },
        session,
        LoginRateLimiter::new(time_source),
    )
}
