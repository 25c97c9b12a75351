mod common;

use std::sync::Arc;

use bundler_core::decode_data_uri;
use bundler_engine::{Agent, BundleOptions, Content, FetchCache, MemoryCache};
use common::StubTransport;
use pretty_assertions::assert_eq;

const BASE: &str = "https://site.example/blog/post.html";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0, 1, 2, 255];

fn agent(transport: Arc<StubTransport>, cache: Arc<MemoryCache>) -> Agent {
    engine_logging::initialize_for_tests();
    Agent::new(transport, cache, BundleOptions::default())
}

#[tokio::test]
async fn second_fetch_of_same_url_is_served_from_cache() {
    let transport = Arc::new(
        StubTransport::new().route("https://site.example/blog/a.css", Some("text/css"), "p{}"),
    );
    let cache = Arc::new(MemoryCache::new());
    let mut agent = agent(transport.clone(), cache.clone());

    let first = agent.fetch(BASE, Some("a.css"), None).await.unwrap();
    let second = agent.fetch(BASE, Some("/blog/a.css"), None).await.unwrap();

    assert_eq!(first.content, Content::Text("p{}".to_string()));
    assert_eq!(first.content, second.content);
    assert!(first.metadata.is_some());
    assert!(second.metadata.is_none(), "cache hits carry no metadata");
    assert_eq!(transport.calls_to("https://site.example/blog/a.css"), 1);
}

#[tokio::test]
async fn cache_is_keyed_by_post_redirect_url() {
    let transport = Arc::new(
        StubTransport::new()
            .redirect(
                "https://site.example/old.png",
                "https://cdn.example/new.png",
                Some("image/png"),
                PNG,
            )
            .route("https://cdn.example/new.png", Some("image/png"), PNG),
    );
    let cache = Arc::new(MemoryCache::new());
    let mut agent = agent(transport.clone(), cache.clone());

    let fetched = agent.fetch(BASE, Some("/old.png"), None).await.unwrap();
    assert_eq!(fetched.final_url(), Some("https://cdn.example/new.png"));
    assert!(cache.get("https://cdn.example/new.png").is_some());
    assert!(cache.get("https://site.example/old.png").is_none());

    let again = agent
        .fetch("https://cdn.example/", Some("new.png"), None)
        .await
        .unwrap();
    assert!(again.metadata.is_none());
    assert_eq!(transport.calls_to("https://cdn.example/new.png"), 0);
}

#[tokio::test]
async fn non_text_content_stays_binary() {
    let transport = Arc::new(StubTransport::new().route(
        "https://site.example/blog/logo.png",
        Some("image/png"),
        PNG,
    ));
    let mut agent = agent(transport, Arc::new(MemoryCache::new()));

    let fetched = agent.fetch(BASE, Some("logo.png"), None).await.unwrap();
    assert_eq!(fetched.content, Content::Binary(PNG.into()));
}

#[tokio::test]
async fn failed_fetch_is_recorded_not_raised() {
    let transport = Arc::new(StubTransport::new());
    let mut agent = agent(transport, Arc::new(MemoryCache::new()));

    let result = agent.fetch(BASE, Some("gone.js"), None).await;
    assert!(result.is_err());
    assert_eq!(
        agent.errors(),
        ["Failed to fetch https://site.example/blog/gone.js: http status 404: 404 Not Found"]
    );
}

#[tokio::test]
async fn requested_url_is_percent_encoded() {
    let transport = Arc::new(StubTransport::new());
    let mut agent = agent(transport.clone(), Arc::new(MemoryCache::new()));

    let _ = agent
        .fetch("not a base", Some("https://site.example/a b|c.png"), None)
        .await;
    assert_eq!(transport.calls(), vec!["https://site.example/a%20b%7Cc.png"]);
}

#[tokio::test]
async fn inlined_image_round_trips_with_served_mime() {
    let transport = Arc::new(StubTransport::new().route(
        "https://site.example/blog/img/photo.bin",
        Some("image/webp"),
        PNG,
    ));
    let mut agent = agent(transport, Arc::new(MemoryCache::new()));

    let uri = agent.inline(BASE, "img/photo.bin").await;
    let decoded = decode_data_uri(&uri).expect("data uri");
    assert_eq!(decoded.mime, "image/webp");
    assert_eq!(decoded.bytes, PNG.to_vec());
}

#[tokio::test]
async fn extension_guess_applies_without_content_type() {
    let transport = Arc::new(StubTransport::new().route(
        "https://site.example/fonts/a.woff2",
        None,
        PNG,
    ));
    let mut agent = agent(transport, Arc::new(MemoryCache::new()));

    let uri = agent.inline(BASE, "../fonts/a.woff2").await;
    assert!(uri.starts_with("data:application/font-woff2;base64,"));
}

#[tokio::test]
async fn content_type_override_drops_whitespace() {
    let transport = Arc::new(StubTransport::new().route(
        "https://site.example/blog/i.svg",
        Some("image/svg+xml; charset=utf-8"),
        "<svg/>",
    ));
    let mut agent = agent(transport, Arc::new(MemoryCache::new()));

    let uri = agent.inline(BASE, "i.svg").await;
    let decoded = decode_data_uri(&uri).unwrap();
    assert_eq!(decoded.mime, "image/svg+xml;charset=utf-8");
    assert_eq!(decoded.bytes, b"<svg/>".to_vec());
}

#[tokio::test]
async fn inline_passes_through_empty_and_data_references() {
    let transport = Arc::new(StubTransport::new());
    let mut agent = agent(transport.clone(), Arc::new(MemoryCache::new()));

    assert_eq!(agent.inline(BASE, "").await, "");
    assert_eq!(
        agent.inline(BASE, "data:image/gif;base64,R0lG").await,
        "data:image/gif;base64,R0lG"
    );
    assert!(transport.calls().is_empty());
    assert!(agent.errors().is_empty());
}

#[tokio::test]
async fn failed_inline_falls_back_to_absolute_url() {
    let transport = Arc::new(StubTransport::new());
    let mut agent = agent(transport, Arc::new(MemoryCache::new()));

    let result = agent.inline(BASE, "../img/missing.png").await;
    assert_eq!(result, "https://site.example/img/missing.png");
    assert_eq!(agent.errors().len(), 1);
}

#[tokio::test]
async fn duplicate_css_urls_share_one_fetch() {
    let transport = Arc::new(StubTransport::new().route(
        "https://site.example/blog/foo.png",
        Some("image/png"),
        PNG,
    ));
    let mut agent = agent(transport.clone(), Arc::new(MemoryCache::new()));

    let css = ".a { background: url(foo.png); }\n.b { background: url(foo.png); }";
    let out = agent.rewrite_css(BASE, css).await;

    let inlined = format!("url({})", bundler_core::encode_data_uri("image/png", PNG));
    assert_eq!(
        out,
        format!(".a {{ background: {inlined}; }}\n.b {{ background: {inlined}; }}")
    );
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn css_without_urls_or_empty_is_unchanged() {
    let transport = Arc::new(StubTransport::new());
    let mut agent = agent(transport.clone(), Arc::new(MemoryCache::new()));

    assert_eq!(agent.rewrite_css(BASE, "").await, "");
    assert_eq!(
        agent.rewrite_css(BASE, "p { color: red }").await,
        "p { color: red }"
    );
    assert!(transport.calls().is_empty());
}
