//! Integration tests for paginated loading against a mocked content API.
//!
//! Each test starts its own `wiremock` server serving the posts collection,
//! then drives a `FeedLoader` through the same calls the TUI and the `list`
//! command make.

use crfnews::api::{ContentClient, Embedded, PostPage, RemotePost, Rendered, Term};
use crfnews::feed::{CategoryFilter, FeedLoader, FeedState, ItemMapper, LoadOutcome};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATEGORIES: [&str; 3] = ["Notícias", "Cursos", "Eventos"];

fn post_json(id: u64, category: &str) -> Value {
    json!({
        "id": id,
        "date": "2024-05-10T14:30:00",
        "slug": format!("post-{}", id),
        "link": format!("https://example.com/post-{}/", id),
        "title": {"rendered": format!("Post {}", id)},
        "excerpt": {"rendered": format!("<p>Resumo do post <b>{}</b></p>", id)},
        "content": {"rendered": "<p>Corpo</p>"},
        "_embedded": {
            "wp:featuredmedia": [{"source_url": format!("https://example.com/{}.jpg", id)}],
            "wp:term": [[{"id": 1, "name": category}]]
        }
    })
}

fn page_json(ids: std::ops::Range<u64>) -> Value {
    Value::Array(
        ids.map(|id| post_json(id, CATEGORIES[id as usize % CATEGORIES.len()]))
            .collect(),
    )
}

async fn mount_page(server: &MockServer, page: u32, body: Value, total_pages: u32) {
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(body)
                .insert_header("X-WP-TotalPages", total_pages.to_string().as_str())
                .insert_header("X-WP-Total", "30"),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn loader_for(server: &MockServer) -> FeedLoader {
    let base = Url::parse(&format!("{}/wp-json/wp/v2/", server.uri())).unwrap();
    let client = ContentClient::new(base, Duration::from_secs(5)).unwrap();
    FeedLoader::new(client, 12, ItemMapper::default())
}

fn ids(loader: &FeedLoader) -> Vec<u64> {
    loader.state().items().iter().map(|item| item.id).collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_three_pages_accumulate_in_order() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_json(0..12), 3).await;
    mount_page(&server, 2, page_json(12..24), 3).await;
    mount_page(&server, 3, page_json(24..30), 3).await;

    let mut loader = loader_for(&server);
    assert_eq!(
        loader.load_page(1).await,
        LoadOutcome::Applied { page: 1, added: 12 }
    );
    assert!(loader.should_load_more());

    while loader.should_load_more() {
        assert!(matches!(
            loader.load_more().await,
            LoadOutcome::Applied { .. }
        ));
    }

    let state = loader.state();
    assert_eq!(state.items().len(), 30);
    assert_eq!(ids(&loader), (0..30).collect::<Vec<_>>());
    assert_eq!(state.current_page(), 3);
    assert_eq!(state.total_pages(), 3);
    assert_eq!(state.total_posts(), Some(30));
    assert!(!loader.should_load_more());
    assert!(state.is_end_of_list());
}

#[tokio::test]
async fn test_mapping_over_the_wire() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_json(0..1), 1).await;

    let mut loader = loader_for(&server);
    loader.load_page(1).await;

    let item = &loader.state().items()[0];
    assert_eq!(item.category, "Notícias");
    assert_eq!(item.excerpt, "Resumo do post 0...");
    assert_eq!(item.image_url, "https://example.com/0.jpg");
    assert_eq!(item.published_at, "10 de maio de 2024");
    assert_eq!(item.detail_url, "/publicacao/post-0");
}

#[tokio::test]
async fn test_no_request_past_last_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_json(0..5), 1).await;

    let mut loader = loader_for(&server);
    loader.load_page(1).await;
    assert!(!loader.should_load_more());
    assert!(matches!(
        loader.load_more().await,
        LoadOutcome::Rejected(_)
    ));
    // `expect(1)` on the mock verifies page 2 was never requested
}

#[tokio::test]
async fn test_failed_page_keeps_loaded_items() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_json(0..12), 2).await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut loader = loader_for(&server);
    loader.load_page(1).await;
    let outcome = loader.load_more().await;

    assert!(matches!(outcome, LoadOutcome::Failed(_)));
    let state = loader.state();
    assert_eq!(state.items().len(), 12);
    assert_eq!(state.current_page(), 1);
    assert_eq!(state.total_pages(), 2);
    assert!(state.last_error().is_some());
    assert!(!state.is_loading());
    // The failed page may be requested again
    assert!(loader.should_load_more());
}

#[tokio::test]
async fn test_malformed_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let mut loader = loader_for(&server);
    assert!(matches!(
        loader.load_page(1).await,
        LoadOutcome::Failed(_)
    ));
    assert!(loader.state().items().is_empty());
}

#[tokio::test]
async fn test_filter_while_paginating() {
    let server = MockServer::start().await;
    mount_page(&server, 1, page_json(0..12), 2).await;
    mount_page(&server, 2, page_json(12..24), 2).await;

    let mut loader = loader_for(&server);
    loader.set_filter(CategoryFilter::category("Cursos"));
    loader.load_page(1).await;
    loader.load_more().await;

    let visible: Vec<u64> = loader.visible_items().iter().map(|i| i.id).collect();
    let expected: Vec<u64> = (0..24).filter(|id| id % 3 == 1).collect();
    assert_eq!(visible, expected);
    assert_eq!(loader.state().items().len(), 24);
}

#[tokio::test]
async fn test_remount_starts_over() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(0..3))
                .insert_header("X-WP-TotalPages", "1"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut loader = loader_for(&server);
    loader.load_page(1).await;
    loader.remount();
    assert!(loader.state().items().is_empty());
    loader.load_page(1).await;
    assert_eq!(ids(&loader), vec![0, 1, 2]);
}

// ============================================================================
// Properties
// ============================================================================

fn remote_post(id: u64, category: &str) -> RemotePost {
    RemotePost {
        id,
        date: "2024-01-01T00:00:00".to_string(),
        slug: format!("p{}", id),
        link: None,
        title: Rendered::default(),
        excerpt: Rendered::default(),
        content: Rendered::default(),
        embedded: Some(Embedded {
            featured_media: vec![],
            terms: vec![vec![Term {
                id: None,
                name: category.to_string(),
            }]],
        }),
    }
}

/// Pages of category indices; post ids are assigned in load order.
fn pages_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0..CATEGORIES.len(), 0..8), 1..6)
}

fn build_state(pages: &[Vec<usize>]) -> (FeedState, Vec<(u64, &'static str)>) {
    let mut state = FeedState::new(ItemMapper::default());
    let mut expected = Vec::new();
    let mut next_id = 0u64;
    let total = pages.len() as u32;

    for (index, page) in pages.iter().enumerate() {
        let posts: Vec<RemotePost> = page
            .iter()
            .map(|&cat| {
                let id = next_id;
                next_id += 1;
                expected.push((id, CATEGORIES[cat]));
                remote_post(id, CATEGORIES[cat])
            })
            .collect();
        let ticket = state.begin_load(index as u32 + 1).unwrap();
        state.complete_load(
            ticket,
            Ok(PostPage {
                posts,
                total_pages: Some(total),
                total_posts: None,
            }),
        );
    }
    (state, expected)
}

proptest! {
    #[test]
    fn prop_monotone_loads_concatenate_pages(pages in pages_strategy()) {
        let (state, expected) = build_state(&pages);
        let got: Vec<u64> = state.items().iter().map(|i| i.id).collect();
        let want: Vec<u64> = expected.iter().map(|(id, _)| *id).collect();
        prop_assert_eq!(got, want);
        prop_assert_eq!(state.current_page(), pages.len() as u32);
        prop_assert!(!state.should_load_more());
    }

    #[test]
    fn prop_filter_is_ordered_subsequence(
        pages in pages_strategy(),
        pick in 0..CATEGORIES.len(),
    ) {
        let (mut state, expected) = build_state(&pages);
        let category = CATEGORIES[pick];

        state.set_filter(CategoryFilter::category(category));
        let got: Vec<u64> = state.visible_items().iter().map(|i| i.id).collect();
        let want: Vec<u64> = expected
            .iter()
            .filter(|(_, c)| *c == category)
            .map(|(id, _)| *id)
            .collect();
        prop_assert_eq!(got, want);

        state.set_filter(CategoryFilter::All);
        prop_assert_eq!(state.visible_len(), state.items().len());
    }
}
