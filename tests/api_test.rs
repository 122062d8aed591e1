//! REST client tests against an in-process mock backend.

mod common;

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use tidewatch::TidewatchError;
use tidewatch::models::{Chain, DepositStatus, Selection};

use common::{ADDRESS_JSON, HISTORY_JSON, LOGIN_JSON, PENDING_JSON, Recorder, USDC, client, serve};

#[tokio::test]
async fn test_login_returns_token_and_username() {
    let recorder = Recorder::default();
    let router = Router::new()
        .route(
            "/api/auth/login",
            post(
                |State(rec): State<Recorder>, headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                    rec.record(&headers, None, Some(body));
                    Json(common::json(LOGIN_JSON))
                },
            ),
        )
        .with_state(recorder.clone());
    let api = client(&serve(router).await);

    let response = api.login("alice", "hunter2").await.unwrap();

    assert_eq!(response.username, "alice");
    assert!(response.token.starts_with("eyJ"));
    let seen = recorder.last();
    assert_eq!(seen.body.unwrap(), json!({"username": "alice", "password": "hunter2"}));
    assert!(seen.authorization.is_none());
}

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let router = Router::new().route(
        "/api/auth/login",
        post(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid username or password"})),
            )
        }),
    );
    let api = client(&serve(router).await);

    let err = api.login("alice", "wrong").await.unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.to_string(), "Invalid username or password");
}

#[tokio::test]
async fn test_error_without_json_body_uses_status_reason() {
    let router = Router::new().route(
        "/api/deposit/pending",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
    );
    let api = client(&serve(router).await);

    let err = api.pending_deposits("jwt").await.unwrap_err();

    match err {
        TidewatchError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "HTTP 500 Internal Server Error");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_register_success_and_conflict() {
    let router = Router::new().route(
        "/api/auth/register",
        post(|Json(body): Json<serde_json::Value>| async move {
            if body["username"] == "taken" {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "Username already exists"})),
                )
            } else {
                (StatusCode::OK, Json(json!({"message": "User registered successfully"})))
            }
        }),
    );
    let api = client(&serve(router).await);

    assert_ok!(api.register("bob", "bob@example.com", "pw").await);
    let err = assert_err!(api.register("taken", "t@example.com", "pw").await);
    assert_eq!(err.to_string(), "Username already exists");
}

#[tokio::test]
async fn test_address_lookups_send_bearer_and_selection() {
    let recorder = Recorder::default();
    let handler = |State(rec): State<Recorder>, headers: HeaderMap, RawQuery(query): RawQuery| async move {
        rec.record(&headers, query, None);
        Json(common::json(ADDRESS_JSON))
    };
    let router = Router::new()
        .route("/api/deposit/current-address", get(handler))
        .route("/api/deposit/address", get(handler))
        .with_state(recorder.clone());
    let api = client(&serve(router).await);

    let native = Selection::native(Chain::Sepolia);
    let address = api.current_address("jwt", &native).await.unwrap();
    assert_eq!(address.address, "0x742d35Cc6634C0532925a3b844Bc454e4438f44e");
    assert_eq!(address.qr_png().unwrap()[..4], [0x89, b'P', b'N', b'G']);

    let seen = recorder.last();
    assert_eq!(seen.authorization.as_deref(), Some("Bearer jwt"));
    assert_eq!(seen.query.as_deref(), Some("chain=sepolia&tokenAddress="));

    let token = Selection {
        chain: Chain::Mainnet,
        token: Some(USDC.to_string()),
    };
    let address = api.get_or_create_address("jwt", &token).await.unwrap();
    // Server says sepolia; its answer wins over the requested chain.
    assert_eq!(address.chain, Chain::Sepolia);
    assert_eq!(address.token_address.as_deref(), Some(USDC));
    assert_eq!(
        recorder.last().query.as_deref(),
        Some(format!("chain=mainnet&tokenAddress={USDC}").as_str())
    );
}

#[tokio::test]
async fn test_current_address_missing_is_an_api_error() {
    let router = Router::new().route(
        "/api/deposit/current-address",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"error": "No active deposit address"})),
            )
        }),
    );
    let api = client(&serve(router).await);

    let err = api
        .current_address("jwt", &Selection::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), Some(404));
}

#[tokio::test]
async fn test_refresh_address_posts_selection() {
    let recorder = Recorder::default();
    let router = Router::new()
        .route(
            "/api/deposit/refresh-address",
            post(
                |State(rec): State<Recorder>, headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                    rec.record(&headers, None, Some(body));
                    Json(json!({
                        "address": "0x00000000000000000000000000000000000000f2",
                        "chain": "sepolia",
                        "tokenAddress": null,
                        "qrCodeData": null
                    }))
                },
            ),
        )
        .with_state(recorder.clone());
    let api = client(&serve(router).await);

    let address = api
        .refresh_address("jwt", &Selection::native(Chain::Sepolia))
        .await
        .unwrap();

    assert_eq!(address.address, "0x00000000000000000000000000000000000000f2");
    assert!(address.qr_code_data.is_none());
    let seen = recorder.last();
    assert_eq!(seen.authorization.as_deref(), Some("Bearer jwt"));
    assert_eq!(seen.body.unwrap(), json!({"chain": "sepolia", "tokenAddress": null}));
}

#[tokio::test]
async fn test_pending_and_history_parse() {
    let router = Router::new()
        .route("/api/deposit/pending", get(|| async { PENDING_JSON }))
        .route("/api/deposit/history", get(|| async { HISTORY_JSON }));
    let api = client(&serve(router).await);

    let pending = api.pending_deposits("jwt").await.unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].status, DepositStatus::Confirming);
    assert_eq!(pending[1].amount, "25000000");

    let history = api.deposit_history("jwt").await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[1].status, DepositStatus::Credited);
}

#[tokio::test]
async fn test_malformed_body_is_a_json_error() {
    let router = Router::new().route("/api/deposit/pending", get(|| async { "[{\"id\": 1" }));
    let api = client(&serve(router).await);

    let err = api.pending_deposits("jwt").await.unwrap_err();
    assert!(matches!(err, TidewatchError::Json(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client(&format!("http://{addr}"));
    let err = api.deposit_history("jwt").await.unwrap_err();
    assert!(matches!(err, TidewatchError::Http(_)));
}
