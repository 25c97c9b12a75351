use crate::data_uri::encode_data_uri;

const CLOSING_TAG: &str = "</script>";
const CDATA_END: &str = "]]>";
const CDATA_OPEN: &str = "<!--//--><![CDATA[//><!--\n";
const CDATA_CLOSE: &str = "\n//--><!]]>";

/// How a fetched script body ends up in the output document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEmbedding {
    /// The body would close the surrounding tag early; ship it as a `src` data URI.
    DataUri(String),
    /// Inline body wrapped in the CDATA comment idiom.
    Wrapped(String),
    /// Inline body as fetched; it already contains a CDATA terminator.
    Verbatim(String),
}

/// Decides how to embed a script body.
pub fn embed_script(body: &str) -> ScriptEmbedding {
    if body.contains(CLOSING_TAG) {
        ScriptEmbedding::DataUri(encode_data_uri("text/javascript", body.as_bytes()))
    } else if !body.contains(CDATA_END) {
        ScriptEmbedding::Wrapped(format!("{CDATA_OPEN}{body}{CDATA_CLOSE}"))
    } else {
        ScriptEmbedding::Verbatim(body.to_string())
    }
}
