//! Page conversion: fetch the root document, rewrite it element by element,
//! stamp provenance and serialize.

use bundler_core::{
    classify, embed_script, is_image_swap_handler, is_rewritable_anchor, resolve_url,
    ElementKind, ScriptEmbedding, IMAGE_SWAP_HANDLERS,
};
use ego_tree::NodeId;
use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::agent::content_to_text;
use crate::dom::{Document, DomNode, ElementData};
use crate::provenance::build_provenance_comment;
use crate::{Agent, BundleError, Credentials};

impl Agent {
    /// Converts the page at `url` into a single self-contained document.
    ///
    /// Per-resource failures end up in [`Agent::errors`]. When the page itself
    /// cannot be fetched the result is an empty string and one recorded error.
    pub async fn convert(
        &mut self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> Result<String, BundleError> {
        let page = match self.fetch(url, None, credentials).await {
            Ok(page) => page,
            Err(_) => return Ok(String::new()),
        };

        let base = page.final_url().unwrap_or(url).to_string();
        if base != url {
            engine_info!("Using redirected base {} for {}", base, url);
        }

        let html = content_to_text(&page.content, page.content_type(), &base);
        let mut doc = Document::parse(&html);
        let title = doc.title();

        // Only elements present after parsing are visited; nodes inserted
        // while rewriting are never revisited.
        for id in doc.element_ids() {
            if !doc.is_attached(id) {
                continue;
            }
            self.rewrite_element(&mut doc, id, &base).await;
        }

        if self.options.provenance {
            if let Some(root) = doc.find_first("html") {
                let generated_at = (self.clock)();
                let comment = build_provenance_comment(&title, &base, &generated_at);
                doc.prepend_child(root, DomNode::Comment(comment));
            }
        }

        doc.to_html().map_err(BundleError::Serialize)
    }

    async fn rewrite_element(&mut self, doc: &mut Document, id: NodeId, base: &str) {
        let Some(element) = doc.element(id).cloned() else {
            return;
        };

        let id = match classify(element.name(), |key| element.attr(key)) {
            ElementKind::IconLink => {
                self.inline_icon(doc, id, &element, base).await;
                id
            }
            ElementKind::StylesheetLink => {
                // The replacement `<style>` already carries rewritten CSS.
                self.inline_stylesheet(doc, id, &element, base).await;
                return;
            }
            ElementKind::OtherLink => {
                if self.options.absolute_urls {
                    absolutize(doc, id, "href", base);
                }
                id
            }
            ElementKind::Script => {
                if !self.options.keep_scripts {
                    doc.remove(id);
                    return;
                }
                match element.attr("src") {
                    Some(src) if !src.is_empty() => {
                        match self.inline_script(doc, id, &element, base).await {
                            Some(new_id) => new_id,
                            None => return,
                        }
                    }
                    _ => id,
                }
            }
            ElementKind::Image => {
                self.inline_image(doc, id, &element, base).await;
                id
            }
            ElementKind::Anchor => {
                let rewritable = element.attr("href").is_some_and(is_rewritable_anchor);
                if self.options.absolute_urls && rewritable {
                    absolutize(doc, id, "href", base);
                }
                id
            }
            ElementKind::Style | ElementKind::Other => id,
        };

        self.rewrite_inline_style(doc, id, base).await;
        self.rewrite_style_body(doc, id, base).await;
    }

    async fn inline_icon(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        element: &ElementData,
        base: &str,
    ) {
        let href = element.attr("href").unwrap_or_default().to_string();
        let inlined = self.inline(base, &href).await;
        doc.update_element(id, |e| {
            e.set_attr("data-href", href);
            e.set_attr("href", inlined);
        });
    }

    async fn inline_stylesheet(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        element: &ElementData,
        base: &str,
    ) {
        let href = element.attr("href").unwrap_or_default().to_string();

        let mut style = ElementData::new("style");
        style.set_attr("type", element.attr("type").unwrap_or("text/css"));
        style.set_attr("data-href", href.clone());
        style.copy_attrs_except(element, &["href", "type"]);

        let css = match self.fetch(base, Some(&href), None).await {
            Ok(fetched) => content_to_text(&fetched.content, fetched.content_type(), &href),
            Err(_) => String::new(),
        };
        let sheet_url = resolve_url(base, Some(&href));
        let css = self.rewrite_css(&sheet_url, &css).await;

        if let Some(new_id) = doc.replace(id, DomNode::Element(style)) {
            doc.set_text(new_id, css);
        }
    }

    /// Swaps the external script for an inline one. Returns the new node.
    async fn inline_script(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        element: &ElementData,
        base: &str,
    ) -> Option<NodeId> {
        let src = element.attr("src").unwrap_or_default().to_string();

        let mut script = ElementData::new("script");
        let script_type = match element.attr("type") {
            Some(t) if !t.is_empty() => t,
            _ => "text/javascript",
        };
        script.set_attr("type", script_type);
        script.set_attr("data-src", src.clone());
        script.copy_attrs_except(element, &["src", "type"]);

        let body = match self.fetch(base, Some(&src), None).await {
            Ok(fetched) => content_to_text(&fetched.content, fetched.content_type(), &src),
            Err(_) => String::new(),
        };

        let text = match embed_script(&body) {
            ScriptEmbedding::DataUri(uri) => {
                engine_debug!("Script {} closes its own tag; embedding as data uri", src);
                script.set_attr("src", uri);
                None
            }
            ScriptEmbedding::Wrapped(text) | ScriptEmbedding::Verbatim(text) => Some(text),
        };

        let new_id = doc.replace(id, DomNode::Element(script))?;
        if let Some(text) = text {
            doc.set_text(new_id, text);
        }
        Some(new_id)
    }

    async fn inline_image(
        &mut self,
        doc: &mut Document,
        id: NodeId,
        element: &ElementData,
        base: &str,
    ) {
        let src = element.attr("src").unwrap_or_default().to_string();
        let inlined = self.inline(base, &src).await;

        let had_srcset = doc
            .update_element(id, |e| {
                e.set_attr("data-src", src.clone());
                e.set_attr("src", inlined);
                match e.remove_attr("srcset") {
                    Some(srcset) => {
                        e.set_attr("data-srcset", srcset);
                        true
                    }
                    None => false,
                }
            })
            .unwrap_or(false);

        if had_srcset {
            engine_warn!(
                "srcset found in img tag. Attribute will be cleared. File src => {}",
                src
            );
        }

        for handler in IMAGE_SWAP_HANDLERS {
            if element.attr(handler).is_some_and(is_image_swap_handler) {
                engine_warn!(
                    "{} found in img tag {} and unhandled, which may break page",
                    handler,
                    src
                );
            }
        }
    }

    async fn rewrite_inline_style(&mut self, doc: &mut Document, id: NodeId, base: &str) {
        let style = match doc.element(id).and_then(|e| e.attr("style")) {
            Some(style) if !style.is_empty() => style.to_string(),
            _ => return,
        };
        let rewritten = self.rewrite_css(base, &style).await;
        doc.update_element(id, |e| e.set_attr("style", rewritten));
    }

    /// `<style>` bodies, and the rare `<link type="text/css">` carrying text.
    async fn rewrite_style_body(&mut self, doc: &mut Document, id: NodeId, base: &str) {
        let carries_css = match doc.element(id) {
            Some(e) if e.name() == "style" => true,
            Some(e) if e.name() == "link" => e.attr("type") == Some("text/css"),
            _ => false,
        };
        if !carries_css {
            return;
        }

        let css = doc.text_content(id);
        if css.is_empty() {
            return;
        }
        let rewritten = self.rewrite_css(base, &css).await;
        doc.set_text(id, rewritten);
    }
}

/// Keeps the original value in `data-<attr>` and makes `attr` absolute.
fn absolutize(doc: &mut Document, id: NodeId, attr: &str, base: &str) {
    doc.update_element(id, |e| {
        if let Some(original) = e.attr(attr).map(str::to_string) {
            let absolute = resolve_url(base, Some(&original));
            e.set_attr(&format!("data-{attr}"), original);
            e.set_attr(attr, absolute);
        }
    });
}
