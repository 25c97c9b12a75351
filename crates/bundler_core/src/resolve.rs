use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Characters left untouched by [`quote_url`]: everything that already carries
/// URL syntax, an existing `%` escape, and the unreserved set.
const URL_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'%')
    .remove(b'/')
    .remove(b':')
    .remove(b'=')
    .remove(b'&')
    .remove(b'?')
    .remove(b'~')
    .remove(b'#')
    .remove(b'+')
    .remove(b'!')
    .remove(b'$')
    .remove(b',')
    .remove(b';')
    .remove(b'\'')
    .remove(b'@')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'[')
    .remove(b']')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-');

/// Resolves `relative` against `base`.
///
/// An absent or empty reference yields `base` unchanged. When `base` does not
/// parse, the reference is returned on its own (normalized if it is absolute).
pub fn resolve_url(base: &str, relative: Option<&str>) -> String {
    let relative = match relative {
        Some(r) if !r.is_empty() => r,
        _ => return base.to_string(),
    };

    match Url::parse(base) {
        Ok(base_url) => match base_url.join(relative) {
            Ok(joined) => joined.into(),
            Err(_) => relative.to_string(),
        },
        Err(_) => match Url::parse(relative) {
            Ok(absolute) => absolute.into(),
            Err(_) => relative.to_string(),
        },
    }
}

/// Byte-string flavour of [`resolve_url`]; invalid UTF-8 is replaced.
pub fn resolve_url_bytes(base: &[u8], relative: Option<&[u8]>) -> String {
    let base = String::from_utf8_lossy(base);
    let relative = relative.map(String::from_utf8_lossy);
    resolve_url(&base, relative.as_deref())
}

/// Percent-encodes anything outside the URL-safe allowlist.
///
/// Already-escaped sequences survive because `%` itself is safe.
pub fn quote_url(url: &str) -> String {
    utf8_percent_encode(url, URL_SAFE).to_string()
}

/// Turns free-form user input into a fetchable URL.
///
/// Input without an `http://` or `https://` prefix gets `https://` prepended.
pub fn normalize_user_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Lower-cased path part of a reference, without query or fragment.
pub(crate) fn reference_path(reference: &str) -> String {
    let end = reference
        .find(['?', '#'])
        .unwrap_or(reference.len());
    reference[..end].to_ascii_lowercase()
}
