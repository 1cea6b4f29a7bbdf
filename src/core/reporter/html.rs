//! Escaping helpers for the HTML report.

/// Escape text for an HTML element body or a quoted attribute
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `file://` URL for a `/`-separated path.
///
/// Every segment is percent-encoded byte by byte, keeping only the RFC 3986
/// unreserved set. A leading Windows drive (`C:`) keeps its colon.
pub fn file_url(path: &str) -> String {
    let mut url = String::from("file://");
    if !path.starts_with('/') {
        url.push('/');
    }

    for (i, segment) in path.split('/').enumerate() {
        if i > 0 {
            url.push('/');
        }
        if i == 0 && is_drive(segment) {
            url.push_str(segment);
        } else {
            url.push_str(&percent_encode(segment));
        }
    }
    url
}

fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

fn percent_encode(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}
