/// `rel` tokens that mark a link as an icon.
const ICON_RELS: &[&str] = &[
    "icon",
    "mask-icon",
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
];

/// Inline handlers that commonly swap image sources at run time.
pub const IMAGE_SWAP_HANDLERS: &[&str] = &["onerror", "onmouseover", "onmouseout"];

/// Structural kind of an element, decided once before it is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    IconLink,
    StylesheetLink,
    OtherLink,
    Script,
    Image,
    Anchor,
    Style,
    Other,
}

/// Classifies an element from its lower-case local name and an attribute
/// lookup.
///
/// Links without an `href` and images without a `src` fall into `Other`;
/// there is nothing to inline for them.
pub fn classify<'a, F>(name: &str, attr: F) -> ElementKind
where
    F: Fn(&str) -> Option<&'a str>,
{
    match name {
        "link" => {
            let href = match attr("href") {
                Some(href) if !href.is_empty() => href,
                _ => return ElementKind::Other,
            };
            let rel = attr("rel").unwrap_or_default();
            if has_rel(rel, ICON_RELS) {
                ElementKind::IconLink
            } else if attr("type") == Some("text/css")
                || href.to_ascii_lowercase().ends_with(".css")
                || has_rel(rel, &["stylesheet"])
            {
                ElementKind::StylesheetLink
            } else {
                ElementKind::OtherLink
            }
        }
        "script" => ElementKind::Script,
        "img" => match attr("src") {
            Some(src) if !src.is_empty() => ElementKind::Image,
            _ => ElementKind::Other,
        },
        "a" => ElementKind::Anchor,
        "style" => ElementKind::Style,
        _ => ElementKind::Other,
    }
}

fn has_rel(rel: &str, wanted: &[&str]) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| wanted.iter().any(|w| token.eq_ignore_ascii_case(w)))
}

/// True when an inline handler assigns `this.src`, the usual image-swap idiom.
pub fn is_image_swap_handler(value: &str) -> bool {
    value.starts_with("this.src=")
}

/// True for anchors that should be rewritten to absolute form.
pub fn is_rewritable_anchor(href: &str) -> bool {
    !href.starts_with('#')
}
