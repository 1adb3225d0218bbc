//! Plain-text rendition of an upload.

/// Produce the text output for a conversion to `txt`.
///
/// Output always starts with `Converted from: <mime>`. Sources with a
/// `text/` type carry their content verbatim after a blank line; other
/// sources get a short description instead, since binary document
/// extraction is left to the external service.
pub fn extract_text(mime: &str, file_name: &str, bytes: &[u8]) -> String {
    let body = if mime.starts_with("text/") {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        format!(
            "Text extraction from {} is not available for {} ({} bytes).",
            mime,
            file_name,
            bytes.len()
        )
    };

    format!("Converted from: {}\n\n{}", mime, body)
}
