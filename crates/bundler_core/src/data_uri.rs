use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const BASE64_MARKER: &str = ";base64,";

/// Builds `data:<mime>;base64,<payload>`.
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let mut encoded =
        String::with_capacity(5 + mime.len() + BASE64_MARKER.len() + bytes.len().div_ceil(3) * 4);
    encoded.push_str("data:");
    encoded.push_str(mime);
    encoded.push_str(BASE64_MARKER);
    STANDARD.encode_string(bytes, &mut encoded);
    encoded
}

/// True for references that already embed their content.
pub fn is_data_uri(reference: &str) -> bool {
    reference.trim_start().starts_with("data:")
}

/// A base64 data URI split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Decodes a base64 data URI. Returns `None` for anything else, including
/// percent-encoded (non-base64) data URIs.
pub fn decode_data_uri(uri: &str) -> Option<DecodedDataUri> {
    let rest = uri.trim().strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(BASE64_MARKER)?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some(DecodedDataUri {
        mime: mime.to_string(),
        bytes,
    })
}
