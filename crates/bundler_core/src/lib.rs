//! Bundler core: pure, IO-free building blocks of the inlining engine.
mod css;
mod data_uri;
mod element;
mod mime;
mod resolve;
mod script;

pub use css::{clean_reference, substitute_urls, url_references};
pub use data_uri::{decode_data_uri, encode_data_uri, is_data_uri, DecodedDataUri};
pub use element::{
    classify, is_image_swap_handler, is_rewritable_anchor, ElementKind, IMAGE_SWAP_HANDLERS,
};
pub use mime::{guess_mime, is_text_content_type, normalize_content_type, FALLBACK_MIME};
pub use resolve::{normalize_user_url, quote_url, resolve_url, resolve_url_bytes};
pub use script::{embed_script, ScriptEmbedding};
