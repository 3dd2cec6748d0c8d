//! Integration tests for single-post lookup by slug.

use crfnews::api::ContentClient;
use crfnews::feed::{load_detail, DetailState, ItemMapper};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ContentClient {
    let base = Url::parse(&format!("{}/wp-json/wp/v2/", server.uri())).unwrap();
    ContentClient::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_known_slug_loads_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("slug", "posse-diretoria"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 42,
            "date": "2023-12-25T10:00:00",
            "slug": "posse-diretoria",
            "link": "https://example.com/posse-diretoria/",
            "title": {"rendered": "Posse da diretoria &#8211; 2024"},
            "content": {"rendered": "<p>Texto completo</p>"},
            "_embedded": {
                "wp:term": [[{"id": 5, "name": "Institucional"}]]
            }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let state = load_detail(
        &client_for(&server),
        "posse-diretoria",
        &ItemMapper::default(),
    )
    .await;

    let DetailState::Loaded(detail) = state else {
        panic!("expected a loaded post, got {:?}", state);
    };
    assert_eq!(detail.id, 42);
    assert_eq!(detail.category, "Institucional");
    assert_eq!(detail.published_at, "25 de dezembro de 2023");
    assert_eq!(detail.content_html, "<p>Texto completo</p>");
    assert_eq!(detail.image_url, None);
    assert_eq!(
        detail.link.as_deref(),
        Some("https://example.com/posse-diretoria/")
    );
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("slug", "nao-existe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let state = load_detail(&client_for(&server), "nao-existe", &ItemMapper::default()).await;
    assert_eq!(
        state,
        DetailState::NotFound {
            slug: "nao-existe".to_string()
        }
    );
}

#[tokio::test]
async fn test_server_error_is_failure_not_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let state = load_detail(&client_for(&server), "qualquer", &ItemMapper::default()).await;
    assert!(matches!(state, DetailState::Failed { ref slug, .. } if slug == "qualquer"));
}

#[tokio::test]
async fn test_blank_slug_skips_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let state = load_detail(&client_for(&server), "   ", &ItemMapper::default()).await;
    assert!(matches!(state, DetailState::NotFound { .. }));
}
