//! Integration tests for bucket endpoints

use std::time::Duration;

use bucketsync_client::client::BucketClient;
use bucketsync_client::StoreError;
use bucketsync_core::domain::BucketName;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_list_buckets_sends_session_headers() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path("/buckets"))
        .and(header("Authorization", "Bearer session-token"))
        .and(header("X-Thread-Id", common::THREAD))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "buckets": [
                { "name": "site", "key": "k1" },
                { "name": "docs", "key": "k2" },
                { "name": "site", "key": "k3" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let buckets = client.list_buckets(&common::session()).await.unwrap();

    let pairs: Vec<(&str, &str)> = buckets
        .iter()
        .map(|b| (b.name.as_str(), b.key.as_str()))
        .collect();
    assert_eq!(pairs, vec![("site", "k1"), ("docs", "k2"), ("site", "k3")]);
}

#[tokio::test]
async fn test_list_buckets_empty_body() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("GET"))
        .and(path("/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let buckets = client.list_buckets(&common::session()).await.unwrap();
    assert!(buckets.is_empty());
}

#[tokio::test]
async fn test_create_bucket_returns_key() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("POST"))
        .and(path("/buckets"))
        .and(body_json(serde_json::json!({ "name": "site" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "root": { "key": "new-key", "name": "site", "path": "/ipfs/bafyempty" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let name = BucketName::new("site".to_string()).unwrap();
    let key = client
        .create_bucket(&common::session(), &name)
        .await
        .unwrap();
    assert_eq!(key.unwrap().as_str(), "new-key");
}

#[tokio::test]
async fn test_create_bucket_without_root_is_none() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("POST"))
        .and(path("/buckets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let name = BucketName::new("site".to_string()).unwrap();
    let key = client
        .create_bucket(&common::session(), &name)
        .await
        .unwrap();
    assert!(key.is_none());
}

#[tokio::test]
async fn test_remove_bucket_deletes_by_key() {
    let (server, client) = common::setup_store_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/buckets/bkey"))
        .and(header("X-Thread-Id", common::THREAD))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client
        .remove_bucket(&common::session(), &common::bucket_key())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_status_errors_are_classified() {
    let (server, client) = common::setup_store_mock().await;
    common::mount_status(&server, "GET", "/buckets", 403, "thread not allowed").await;
    common::mount_status(&server, "DELETE", "/buckets/bkey", 500, "boom").await;

    let err = client.list_buckets(&common::session()).await.unwrap_err();
    assert!(matches!(err, StoreError::Forbidden(ref m) if m.contains("thread not allowed")));

    let err = client
        .remove_bucket(&common::session(), &common::bucket_key())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::ServerError(_)));
}

#[tokio::test]
async fn test_malformed_json_is_invalid_response() {
    let (server, client) = common::setup_store_mock().await;
    common::mount_status(&server, "GET", "/buckets", 200, "not json").await;

    let err = client.list_buckets(&common::session()).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_gateway_is_network_error() {
    let client =
        bucketsync_client::client::BucketClient::with_base_url("http://127.0.0.1:1").unwrap();
    let err = client.list_buckets(&common::session()).await.unwrap_err();
    assert!(matches!(err, StoreError::NetworkError(_)));
}

#[tokio::test]
async fn test_stalled_gateway_hits_read_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buckets"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(serde_json::json!({})),
        )
        .mount(&server)
        .await;

    let client = BucketClient::new(&server.uri(), Duration::from_millis(200)).unwrap();
    let err = client.list_buckets(&common::session()).await.unwrap_err();
    assert!(matches!(err, StoreError::NetworkError(_)), "{err:?}");
}
