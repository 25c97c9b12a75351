use std::sync::Arc;

use bundler_core::{is_text_content_type, quote_url, resolve_url};
use engine_logging::{engine_error, engine_info, engine_warn};

use crate::cache::FetchCache;
use crate::decode::decode_text;
use crate::fetch::Transport;
use crate::provenance::ctime_now;
use crate::{Content, Credentials, FetchError, Fetched};

/// Produces the human-readable timestamp used in provenance stamps.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Per-conversion switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundleOptions {
    /// Stamp title, source URL and date into a leading comment.
    pub provenance: bool,
    /// Inline external scripts; when off every `<script>` is dropped.
    pub keep_scripts: bool,
    /// Rewrite remaining `<a>` and `<link>` references to absolute URLs.
    pub absolute_urls: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            provenance: true,
            keep_scripts: true,
            absolute_urls: true,
        }
    }
}

/// One conversion run: a shared transport and cache plus this run's errors.
pub struct Agent {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn FetchCache>,
    pub(crate) options: BundleOptions,
    pub(crate) clock: Clock,
    errors: Vec<String>,
}

impl Agent {
    pub fn new(
        transport: Arc<dyn Transport>,
        cache: Arc<dyn FetchCache>,
        options: BundleOptions,
    ) -> Self {
        Self {
            transport,
            cache,
            options,
            clock: Arc::new(ctime_now),
            errors: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Errors recorded so far, in the order they happened.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// Fetches `relative` resolved against `base` through the cache.
    ///
    /// A cache hit carries no metadata. Failures are recorded in the error
    /// list and logged before being returned, so callers that only want
    /// best-effort content can drop the `Err`.
    pub async fn fetch(
        &mut self,
        base: &str,
        relative: Option<&str>,
        credentials: Option<&Credentials>,
    ) -> Result<Fetched, FetchError> {
        let full_url = quote_url(&resolve_url(base, relative));

        if let Some(content) = self.cache.get(&full_url) {
            engine_info!("mem cache hit: {}", full_url);
            return Ok(Fetched {
                content,
                metadata: None,
            });
        }

        engine_info!("GET {}", full_url);
        let output = match self.transport.get(&full_url, credentials).await {
            Ok(output) => output,
            Err(err) => {
                let message = format!("Failed to fetch {full_url}: {err}");
                engine_error!("{}", message);
                self.errors.push(message);
                return Err(err);
            }
        };

        let content_type = output.metadata.content_type.as_deref();
        let content = if content_type.is_some_and(is_text_content_type) {
            Content::Text(text_from_bytes(&output.bytes, content_type, &full_url))
        } else {
            Content::Binary(output.bytes.clone())
        };

        self.cache.put(&output.metadata.final_url, content.clone());
        Ok(Fetched {
            content,
            metadata: Some(output.metadata),
        })
    }
}

/// Text view of fetched content; binary payloads are decoded as well.
pub(crate) fn content_to_text(content: &Content, content_type: Option<&str>, url: &str) -> String {
    match content {
        Content::Text(text) => text.clone(),
        Content::Binary(bytes) => text_from_bytes(bytes, content_type, url),
    }
}

fn text_from_bytes(bytes: &[u8], content_type: Option<&str>, url: &str) -> String {
    let decoded = decode_text(bytes, content_type);
    if decoded.had_errors {
        engine_warn!(
            "Replaced malformed {} sequences while decoding {}",
            decoded.encoding_label,
            url
        );
    }
    decoded.text
}
