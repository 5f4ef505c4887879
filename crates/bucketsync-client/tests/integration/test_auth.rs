//! Integration tests for session establishment

use bucketsync_client::auth::{self, SESSION_LIFETIME_SECS};
use bucketsync_client::StoreError;
use bucketsync_core::domain::ThreadId;
use bucketsync_core::ports::Credentials;
use chrono::{Duration, Utc};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn thread() -> ThreadId {
    ThreadId::new(common::THREAD.to_string()).unwrap()
}

fn credentials(session: Option<&str>) -> Credentials {
    Credentials {
        key: "api-key".to_string(),
        secret: "api-secret".to_string(),
        session_token: session.map(str::to_string),
    }
}

#[tokio::test]
async fn test_derive_session_exchanges_key_and_secret() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("POST"))
        .and(path("/auth/session"))
        .and(body_partial_json(serde_json::json!({
            "key": "api-key",
            "secret": "api-secret"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "derived" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let before = Utc::now();
    let session = auth::establish(&client, &credentials(None), &thread())
        .await
        .expect("establish failed");

    assert_eq!(session.token, "derived");
    assert_eq!(session.thread.as_str(), common::THREAD);
    let expires_at = session.expires_at.expect("derived sessions expire");
    assert!(expires_at >= before + Duration::seconds(SESSION_LIFETIME_SECS));
    assert!(expires_at <= Utc::now() + Duration::seconds(SESSION_LIFETIME_SECS));
}

#[tokio::test]
async fn test_derive_session_sends_expiry() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("POST"))
        .and(path("/auth/session"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "derived" })),
        )
        .mount(&server)
        .await;

    auth::establish(&client, &credentials(None), &thread())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn test_supplied_session_is_reused_without_request() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("POST"))
        .and(path("/auth/session"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = auth::establish(&client, &credentials(Some("pre-issued")), &thread())
        .await
        .unwrap();

    assert_eq!(session.token, "pre-issued");
    assert!(session.expires_at.is_none());
}

#[tokio::test]
async fn test_blank_supplied_session_falls_back_to_key() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("POST"))
        .and(path("/auth/session"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "derived" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let session = auth::establish(&client, &credentials(Some("  ")), &thread())
        .await
        .unwrap();
    assert_eq!(session.token, "derived");
}

#[tokio::test]
async fn test_rejected_credentials_map_to_unauthorized() {
    let (server, client) = common::setup_store_mock().await;
    common::mount_status(&server, "POST", "/auth/session", 401, "bad key").await;

    let err = auth::derive_session(&client, "api-key", "wrong", &thread())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Unauthorized(_)));

    let err = auth::establish(&client, &credentials(None), &thread())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StoreError>(),
        Some(StoreError::Unauthorized(_))
    ));
    assert!(format!("{err:#}").contains("bad key"));
}

#[tokio::test]
async fn test_empty_token_is_invalid_response() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("POST"))
        .and(path("/auth/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": "" })))
        .mount(&server)
        .await;

    let err = auth::derive_session(&client, "api-key", "api-secret", &thread())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidResponse(_)));
}
