//! Shared test utilities: an in-process mock of the custody backend.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::HeaderMap;
use tidewatch::api::ApiClient;

pub const LOGIN_JSON: &str = include_str!("../fixtures/login.json");
pub const ADDRESS_JSON: &str = include_str!("../fixtures/address.json");
pub const PENDING_JSON: &str = include_str!("../fixtures/pending.json");
pub const HISTORY_JSON: &str = include_str!("../fixtures/history.json");

/// USDC on Sepolia, as listed in the test asset registry.
pub const USDC: &str = "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238";

/// Asset registry with native ETH and Sepolia USDC.
pub const REGISTRY_JSON: &str = r#"{
    "native": { "symbol": "ETH", "decimals": 18 },
    "tokens": [
        { "symbol": "USDC", "address": "0x1c7d4b196cb0c7b01d743fbc6116a902379c7238", "decimals": 6 }
    ]
}"#;

/// What the mock backend saw for one request.
#[derive(Clone, Debug, Default)]
pub struct Seen {
    pub authorization: Option<String>,
    pub query: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Request log shared between handlers and the test body.
#[derive(Clone, Debug, Default)]
pub struct Recorder(Arc<Mutex<Vec<Seen>>>);

impl Recorder {
    pub fn record(&self, headers: &HeaderMap, query: Option<String>, body: Option<serde_json::Value>) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push(Seen {
            authorization,
            query,
            body,
        });
    }

    pub fn all(&self) -> Vec<Seen> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> Seen {
        self.all().pop().expect("no request recorded")
    }
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock backend");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock backend failed");
    });
    format!("http://{addr}")
}

/// Plain-HTTP client for the mock backend.
pub fn client(base_url: &str) -> ApiClient {
    ApiClient::with_client(base_url, reqwest::Client::new())
}

/// Parses a fixture into a JSON value.
pub fn json(fixture: &str) -> serde_json::Value {
    serde_json::from_str(fixture).expect("invalid fixture")
}
