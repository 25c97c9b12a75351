use crate::resolve::reference_path;

/// Used when the extension is unknown. Lenient on purpose: most unlabelled
/// subresources on real pages are images.
pub const FALLBACK_MIME: &str = "image/png";

const EXTENSION_MIME: &[(&str, &str)] = &[
    (".png", "image/png"),
    (".gif", "image/gif"),
    (".ico", "image/x-icon"),
    (".jpg", "image/jpg"),
    (".jpeg", "image/jpg"),
    (".svg", "image/svg+xml"),
    (".ttf", "application/x-font-ttf"),
    (".otf", "application/x-font-opentype"),
    (".woff", "application/font-woff"),
    (".woff2", "application/font-woff2"),
    (".eot", "application/vnd.ms-fontobject"),
    (".sfnt", "application/font-sfnt"),
    (".css", "text/css"),
    (".less", "text/css"),
    (".js", "application/javascript"),
];

/// Guesses a MIME type from the extension of a reference's path.
pub fn guess_mime(reference: &str) -> &'static str {
    let path = reference_path(reference);
    EXTENSION_MIME
        .iter()
        .find(|(ext, _)| path.ends_with(ext))
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_MIME)
}

/// Removes all whitespace from a served content-type so it can sit inside a
/// data URI. Returns `None` when nothing is left.
pub fn normalize_content_type(content_type: &str) -> Option<String> {
    let compact: String = content_type
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if compact.is_empty() {
        None
    } else {
        Some(compact)
    }
}

/// True when a content-type announces text (`text/*`).
pub fn is_text_content_type(content_type: &str) -> bool {
    content_type
        .trim_start()
        .get(..5)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("text/"))
}
