//! Integration tests for `SearchClient` using wiremock HTTP mocks.

use flowpulse_core::{compute_ratios, CanonicalObservation};
use flowpulse_search::SearchClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn observation() -> CanonicalObservation {
    CanonicalObservation {
        platform: "YouTube".to_string(),
        source_id: "v1".to_string(),
        source_url: None,
        title: "How To n8n".to_string(),
        normalized_title: "how to n8n".to_string(),
        country: "US".to_string(),
        metrics: compute_ratios(1000, 50, 10),
        collected_at: None,
    }
}

#[tokio::test]
async fn indexes_document_under_platform_source_id() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/flowpulse_workflows/_doc/YouTube-v1"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = SearchClient::new(&server.uri(), "admin", "admin").unwrap();
    client.index_observation(&observation()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["workflow"], "How To n8n");
    assert_eq!(body["platform"], "YouTube");
    assert_eq!(body["score"], 1000.0);
}

#[tokio::test]
async fn rejection_surfaces_as_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
        .mount(&server)
        .await;

    let client = SearchClient::new(&server.uri(), "admin", "admin").unwrap();
    let result = client.index_observation(&observation()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn ensure_index_skips_create_when_present() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/flowpulse_workflows"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/flowpulse_workflows"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = SearchClient::new(&server.uri(), "admin", "admin").unwrap();
    client.ensure_index().await.unwrap();
}

#[tokio::test]
async fn ensure_index_creates_when_missing() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/flowpulse_workflows"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/flowpulse_workflows"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = SearchClient::new(&server.uri(), "admin", "admin").unwrap();
    client.ensure_index().await.unwrap();
}
