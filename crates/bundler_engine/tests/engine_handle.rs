mod common;

use std::collections::HashMap;
use std::sync::Arc;

use bundler_engine::{
    BundleError, Credentials, EngineConfig, EngineEvent, EngineHandle, FetchError, FetchOutput,
    MemoryCache, Transport,
};
use common::StubTransport;
use pretty_assertions::assert_eq;

fn config() -> EngineConfig {
    EngineConfig {
        clock: Arc::new(|| "Thu Jan  1 00:00:00 2026".to_string()),
        ..EngineConfig::default()
    }
}

#[test]
fn jobs_report_start_and_completion() {
    engine_logging::initialize_for_tests();
    let transport = Arc::new(
        StubTransport::new()
            .route(
                "https://one.example/",
                Some("text/html"),
                "<html><head><title>One</title></head><body></body></html>",
            )
            .route(
                "https://two.example/",
                Some("text/html"),
                "<html><body><img src=\"gone.png\"></body></html>",
            ),
    );
    let engine =
        EngineHandle::with_parts(config(), transport.clone(), Arc::new(MemoryCache::new()))
            .unwrap();

    engine.enqueue(1, "https://one.example/", None).unwrap();
    engine.enqueue(2, "https://two.example/", None).unwrap();

    let mut started = Vec::new();
    let mut completed = HashMap::new();
    while completed.len() < 2 {
        match engine.recv().unwrap() {
            EngineEvent::Started { job_id, url } => started.push((job_id, url)),
            EngineEvent::JobCompleted { job_id, result } => {
                completed.insert(job_id, result.unwrap());
            }
        }
    }

    started.sort();
    assert_eq!(
        started,
        vec![
            (1, "https://one.example/".to_string()),
            (2, "https://two.example/".to_string()),
        ]
    );

    let one = &completed[&1];
    assert_eq!(one.source_url, "https://one.example/");
    assert!(one.html.contains("title: One"));
    assert!(one.errors.is_empty());

    let two = &completed[&2];
    assert!(two.html.contains("src=\"https://two.example/gone.png\""));
    assert_eq!(two.errors.len(), 1);
    assert_eq!(transport.calls_to("https://two.example/gone.png"), 1);
}

#[test]
fn unreachable_page_completes_with_empty_output() {
    engine_logging::initialize_for_tests();
    let engine = EngineHandle::with_parts(
        config(),
        Arc::new(StubTransport::new()),
        Arc::new(MemoryCache::new()),
    )
    .unwrap();

    engine.enqueue(7, "https://nowhere.example/", None).unwrap();

    loop {
        if let EngineEvent::JobCompleted { job_id, result } = engine.recv().unwrap() {
            assert_eq!(job_id, 7);
            let output = result.unwrap();
            assert!(output.html.is_empty());
            assert_eq!(
                output.errors,
                vec!["Failed to fetch https://nowhere.example/: http status 404: 404 Not Found"
                    .to_string()]
            );
            break;
        }
    }
}

struct PanickingTransport;

#[async_trait::async_trait]
impl Transport for PanickingTransport {
    async fn get(
        &self,
        _url: &str,
        _credentials: Option<&Credentials>,
    ) -> Result<FetchOutput, FetchError> {
        panic!("transport blew up");
    }
}

#[test]
fn panicking_job_still_completes() {
    engine_logging::initialize_for_tests();
    let engine = EngineHandle::with_parts(
        config(),
        Arc::new(PanickingTransport),
        Arc::new(MemoryCache::new()),
    )
    .unwrap();

    engine.enqueue(3, "https://boom.example/", None).unwrap();

    loop {
        if let EngineEvent::JobCompleted { job_id, result } = engine.recv().unwrap() {
            assert_eq!(job_id, 3);
            assert!(matches!(result, Err(BundleError::JobAborted(_))));
            break;
        }
    }
}
