//! Integration tests for `YouTubeClient` using wiremock HTTP mocks.

use flowpulse_fetch::{FetchSettings, YouTubeClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings() -> FetchSettings {
    FetchSettings {
        backoff_base_ms: 0, // keep retry tests fast
        ..FetchSettings::default()
    }
}

fn test_client(base_url: &str) -> YouTubeClient {
    YouTubeClient::with_base_url(Some("test-key".to_string()), settings(), base_url)
        .expect("client construction should not fail")
}

fn search_body() -> serde_json::Value {
    serde_json::json!({
        "items": [
            { "id": { "kind": "youtube#video", "videoId": "v1" } },
            { "id": { "kind": "youtube#channel", "channelId": "c1" } },
            { "id": { "kind": "youtube#video", "videoId": "v2" } }
        ]
    })
}

fn videos_body() -> serde_json::Value {
    serde_json::json!({
        "items": [
            {
                "id": "v1",
                "snippet": {
                    "title": "How To n8n 03:15",
                    "publishedAt": "2025-05-01T10:00:00Z"
                },
                "statistics": {
                    "viewCount": "1000",
                    "likeCount": "50",
                    "commentCount": "10"
                }
            },
            {
                "id": "v2",
                "snippet": { "title": "n8n advanced" },
                "statistics": { "viewCount": "200" }
            }
        ]
    })
}

#[tokio::test]
async fn two_phase_fetch_produces_observations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "n8n automation"))
        .and(query_param("regionCode", "US"))
        .and(query_param("maxResults", "50"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;

    // Channel results have no videoId; only v1 and v2 reach phase two.
    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "v1,v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(videos_body()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let observations = client.fetch("n8n automation", "US", 50).await.unwrap();

    assert_eq!(observations.len(), 2);

    let first = &observations[0];
    assert_eq!(first.platform, "YouTube");
    assert_eq!(first.source_id, "v1");
    assert_eq!(
        first.source_url.as_deref(),
        Some("https://www.youtube.com/watch?v=v1")
    );
    assert_eq!(first.title, "How To n8n 03:15");
    assert_eq!(first.normalized_title, "how to n8n");
    assert_eq!(first.country, "US");
    assert_eq!(first.metrics["views"], 1000);
    assert_eq!(first.metrics["likes"], 50);
    assert_eq!(first.metrics["comments"], 10);
    assert!((first.metrics["like_to_view_ratio"].as_f64().unwrap() - 0.05).abs() < 1e-9);
    assert!(first.collected_at.is_some());

    // Absent statistics parse as zero, ratios guarded.
    let second = &observations[1];
    assert_eq!(second.metrics["views"], 200);
    assert_eq!(second.metrics["likes"], 0);
    assert_eq!(second.metrics["like_to_view_ratio"].as_f64().unwrap(), 0.0);
    assert!(second.collected_at.is_none());
}

#[tokio::test]
async fn missing_api_key_degrades_to_empty() {
    // No server: a request attempt would fail loudly.
    let client =
        YouTubeClient::with_base_url(None, settings(), "http://127.0.0.1:1").unwrap();
    let observations = client.fetch("n8n automation", "US", 50).await.unwrap();
    assert!(observations.is_empty());
}

#[tokio::test]
async fn placeholder_api_key_degrades_to_empty() {
    let client = YouTubeClient::with_base_url(
        Some("YOUR_YT_KEY".to_string()),
        settings(),
        "http://127.0.0.1:1",
    )
    .unwrap();
    let observations = client.fetch("n8n automation", "US", 50).await.unwrap();
    assert!(observations.is_empty());
}

#[tokio::test]
async fn empty_search_skips_the_videos_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let observations = client.fetch("n8n automation", "US", 50).await.unwrap();
    assert!(observations.is_empty());
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(videos_body()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let observations = client.fetch("n8n automation", "US", 50).await.unwrap();
    assert_eq!(observations.len(), 2);
}

#[tokio::test]
async fn persistent_client_error_surfaces() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let result = client.fetch("n8n automation", "US", 50).await;
    assert!(result.is_err(), "a 403 is not retriable and must surface");
    // One attempt only: 403 is not a transient failure.
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
