use bundler_core::{
    decode_data_uri, embed_script, encode_data_uri, guess_mime, is_data_uri,
    is_text_content_type, normalize_content_type, ScriptEmbedding, FALLBACK_MIME,
};
use pretty_assertions::assert_eq;

#[test]
fn extension_table_covers_fonts_images_and_code() {
    assert_eq!(guess_mime("a.png"), "image/png");
    assert_eq!(guess_mime("a.GIF"), "image/gif");
    assert_eq!(guess_mime("favicon.ico"), "image/x-icon");
    assert_eq!(guess_mime("photo.jpeg"), "image/jpg");
    assert_eq!(guess_mime("photo.jpg?w=200"), "image/jpg");
    assert_eq!(guess_mime("logo.svg#icon"), "image/svg+xml");
    assert_eq!(guess_mime("f.ttf"), "application/x-font-ttf");
    assert_eq!(guess_mime("f.otf"), "application/x-font-opentype");
    assert_eq!(guess_mime("f.woff"), "application/font-woff");
    assert_eq!(guess_mime("f.woff2"), "application/font-woff2");
    assert_eq!(guess_mime("f.eot?#iefix"), "application/vnd.ms-fontobject");
    assert_eq!(guess_mime("f.sfnt"), "application/font-sfnt");
    assert_eq!(guess_mime("site.less"), "text/css");
    assert_eq!(guess_mime("site.css"), "text/css");
    assert_eq!(guess_mime("app.js"), "application/javascript");
}

#[test]
fn unknown_extension_defaults_to_png() {
    assert_eq!(guess_mime("/image?id=42"), FALLBACK_MIME);
    assert_eq!(guess_mime("blob"), "image/png");
}

#[test]
fn content_type_whitespace_is_removed() {
    assert_eq!(
        normalize_content_type("text/css; charset=utf-8").as_deref(),
        Some("text/css;charset=utf-8")
    );
    assert_eq!(normalize_content_type("  \t"), None);
}

#[test]
fn text_content_types_are_detected_case_insensitively() {
    assert!(is_text_content_type("text/html; charset=utf-8"));
    assert!(is_text_content_type("Text/CSS"));
    assert!(!is_text_content_type("image/png"));
    assert!(!is_text_content_type("application/javascript"));
    assert!(!is_text_content_type("tex"));
}

#[test]
fn data_uri_payload_decodes_to_original_bytes() {
    let bytes = [0u8, 159, 146, 150, b'\n', 255];
    let uri = encode_data_uri("image/png", &bytes);
    assert!(uri.starts_with("data:image/png;base64,"));
    assert!(is_data_uri(&uri));

    let decoded = decode_data_uri(&uri).expect("base64 data uri");
    assert_eq!(decoded.mime, "image/png");
    assert_eq!(decoded.bytes, bytes.to_vec());
}

#[test]
fn mime_parameters_survive_decoding() {
    let uri = encode_data_uri("text/css;charset=utf-8", b"a{}");
    let decoded = decode_data_uri(&uri).expect("base64 data uri");
    assert_eq!(decoded.mime, "text/css;charset=utf-8");
    assert_eq!(decoded.bytes, b"a{}".to_vec());
}

#[test]
fn non_base64_data_uri_is_not_decoded() {
    assert!(is_data_uri(" data:text/plain,hello"));
    assert_eq!(decode_data_uri("data:text/plain,hello"), None);
    assert_eq!(decode_data_uri("https://ex.com/a.png"), None);
}

#[test]
fn script_with_closing_tag_becomes_data_uri() {
    let body = "document.write('<script></script>');";
    match embed_script(body) {
        ScriptEmbedding::DataUri(uri) => {
            let decoded = decode_data_uri(&uri).expect("data uri");
            assert_eq!(decoded.mime, "text/javascript");
            assert_eq!(decoded.bytes, body.as_bytes().to_vec());
        }
        other => panic!("expected data uri, got {other:?}"),
    }
}

#[test]
fn plain_script_is_wrapped_in_cdata_comment() {
    assert_eq!(
        embed_script("var a = 1 < 2;"),
        ScriptEmbedding::Wrapped(
            "<!--//--><![CDATA[//><!--\nvar a = 1 < 2;\n//--><!]]>".to_string()
        )
    );
}

#[test]
fn script_with_cdata_terminator_is_verbatim() {
    let body = "var s = ']]>';";
    assert_eq!(embed_script(body), ScriptEmbedding::Verbatim(body.to_string()));
}
