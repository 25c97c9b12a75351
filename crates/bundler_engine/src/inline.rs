use std::collections::HashMap;

use bundler_core::{
    clean_reference, encode_data_uri, guess_mime, is_data_uri, normalize_content_type,
    resolve_url, substitute_urls, url_references,
};

use crate::Agent;

impl Agent {
    /// Inlines `reference` as a base64 data URI.
    ///
    /// Empty references and existing data URIs come back unchanged. When the
    /// fetch fails the absolute URL is returned so the element keeps pointing
    /// at the original resource.
    pub async fn inline(&mut self, base: &str, reference: &str) -> String {
        if reference.is_empty() || is_data_uri(reference) {
            return reference.to_string();
        }

        let guessed = guess_mime(reference);
        match self.fetch(base, Some(reference), None).await {
            Ok(fetched) if !fetched.content.is_empty() => {
                let mime = fetched
                    .content_type()
                    .and_then(normalize_content_type)
                    .unwrap_or_else(|| guessed.to_string());
                encode_data_uri(&mime, fetched.content.as_bytes())
            }
            _ => resolve_url(base, Some(reference)),
        }
    }

    /// Inlines every `url(...)` in `css`. Each distinct capture is fetched once.
    pub async fn rewrite_css(&mut self, base: &str, css: &str) -> String {
        if css.is_empty() {
            return String::new();
        }

        let mut replacements = HashMap::new();
        for raw in url_references(css) {
            let inlined = self.inline(base, clean_reference(raw)).await;
            replacements.insert(raw.to_string(), inlined);
        }
        if replacements.is_empty() {
            return css.to_string();
        }

        substitute_urls(css, &replacements)
    }
}
