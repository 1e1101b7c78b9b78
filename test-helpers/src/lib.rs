//! Test support: an in-process mock of the listings backend, seed data, and
//! controllable operations for exercising the fetch layer.

pub mod backend;
pub mod mock;
pub mod ops;

use std::sync::Arc;
use std::time::Duration;

use backend::Store;
use fetch::telemetry;
use reqwest::StatusCode;
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;

pub struct TestApp {
    #[allow(unused)]
    pub port: u16,
    pub client: Arc<payloads::APIClient>,
    pub store: Arc<Store>,
}

impl TestApp {
    pub fn address(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// A client for this app whose requests give up after `timeout`.
    pub fn client_with_timeout(
        &self,
        timeout: Duration,
    ) -> anyhow::Result<payloads::APIClient> {
        Ok(payloads::APIClient {
            address: self.address(),
            inner_client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    /// Log in as the seeded user and return the bearer token.
    pub async fn login_alice(&self) -> anyhow::Result<String> {
        let session = self
            .client
            .login(&mock::alice_credentials())
            .await?
            .into_data()?;
        Ok(session.token)
    }
}

pub async fn spawn_app_on_port(port: u16) -> TestApp {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();

    let store = Arc::new(Store::default());
    let (server, port) =
        backend::build("127.0.0.1", port, store.clone()).unwrap();
    tokio::spawn(server);

    TestApp {
        port,
        client: Arc::new(payloads::APIClient {
            address: format!("http://127.0.0.1:{port}"),
            inner_client: reqwest::Client::new(),
        }),
        store,
    }
}

/// Use OS-assigned port for parallel testing.
pub async fn spawn_app() -> TestApp {
    spawn_app_on_port(0).await
}

/// An address nothing is listening on.
pub fn unreachable_client() -> payloads::APIClient {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    payloads::APIClient {
        address: format!("http://127.0.0.1:{port}"),
        inner_client: reqwest::Client::new(),
    }
}

/// Assert that the result of an API action results in a specific status code.
pub fn assert_status_code<T>(
    result: Result<T, payloads::ClientError>,
    expected: StatusCode,
) {
    match result {
        Err(payloads::ClientError::APIError(code, _)) => {
            assert_eq!(code, expected)
        }
        _ => panic!("Expected APIError"),
    };
}
