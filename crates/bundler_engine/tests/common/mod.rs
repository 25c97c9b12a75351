#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use bundler_engine::{Credentials, FailureKind, FetchError, FetchMetadata, FetchOutput, Transport};
use bytes::Bytes;

struct StubResponse {
    final_url: Option<String>,
    content_type: Option<String>,
    body: Bytes,
}

/// In-memory transport that records every request it serves.
#[derive(Default)]
pub struct StubTransport {
    routes: HashMap<String, StubResponse>,
    calls: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        self.routes.insert(
            url.to_string(),
            StubResponse {
                final_url: None,
                content_type: content_type.map(str::to_string),
                body: body.into(),
            },
        );
        self
    }

    pub fn redirect(
        mut self,
        url: &str,
        final_url: &str,
        content_type: Option<&str>,
        body: impl Into<Bytes>,
    ) -> Self {
        self.routes.insert(
            url.to_string(),
            StubResponse {
                final_url: Some(final_url.to_string()),
                content_type: content_type.map(str::to_string),
                body: body.into(),
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

#[async_trait::async_trait]
impl Transport for StubTransport {
    async fn get(
        &self,
        url: &str,
        _credentials: Option<&Credentials>,
    ) -> Result<FetchOutput, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let response = self
            .routes
            .get(url)
            .ok_or_else(|| FetchError::new(FailureKind::HttpStatus(404), "404 Not Found"))?;
        Ok(FetchOutput {
            bytes: response.body.clone(),
            metadata: FetchMetadata {
                original_url: url.to_string(),
                final_url: response.final_url.clone().unwrap_or_else(|| url.to_string()),
                content_type: response.content_type.clone(),
                byte_len: response.body.len() as u64,
            },
        })
    }
}
