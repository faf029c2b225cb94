use crate::fetcher::{errors::FetchError, types::PageResponse};
use bytes::Bytes;
use chrono::Utc;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::StatusCode;
use std::sync::LazyLock;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

/// Bytes of the body inspected for a `<meta charset>` declaration.
const SNIFF_LEN: usize = 4096;

pub fn process_response(
    url_final: Url,
    status: StatusCode,
    body_bytes: Bytes,
    content_type: &str,
) -> Result<PageResponse, FetchError> {
    let encoding = detect_encoding(content_type, &body_bytes);
    let body_utf8 = decode_to_utf8(&body_bytes, encoding)?;

    Ok(PageResponse {
        url_final,
        status,
        body_utf8,
        encoding: encoding.name(),
        fetched_at: Utc::now(),
    })
}

fn detect_encoding(content_type: &str, body_bytes: &[u8]) -> &'static Encoding {
    // Content-Type header wins
    if let Some(encoding) = label_from(&CHARSET_REGEX, content_type) {
        return encoding;
    }

    let head = &body_bytes[..body_bytes.len().min(SNIFF_LEN)];
    if let Some(encoding) = label_from(&META_CHARSET_REGEX, &String::from_utf8_lossy(head)) {
        return encoding;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(head, body_bytes.len() <= SNIFF_LEN);
    detector.guess(None, true)
}

fn label_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?.as_str().to_lowercase();
    Encoding::for_label(label.as_bytes())
}

fn decode_to_utf8(body_bytes: &[u8], encoding: &'static Encoding) -> Result<String, FetchError> {
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "failed to decode content with encoding: {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_encoding_from_content_type() {
        let body = b"<html><head><title>Test</title></head></html>";
        let encoding = detect_encoding("text/html; charset=utf-8", body);
        assert_eq!(encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn test_detect_encoding_from_meta_tag() {
        let body = b"<html><head><meta charset=\"iso-8859-1\"><title>Test</title></head></html>";
        // encoding_rs maps ISO-8859-1 onto its superset windows-1252
        let encoding = detect_encoding("text/html", body);
        assert_eq!(encoding, encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_header_beats_meta_tag() {
        let body = b"<html><head><meta charset=\"iso-8859-1\"></head></html>";
        let encoding = detect_encoding("text/html; charset=\"UTF-8\"", body);
        assert_eq!(encoding, encoding_rs::UTF_8);
    }

    #[test]
    fn test_decode_utf8() {
        let decoded = decode_to_utf8("Hello, 世界!".as_bytes(), encoding_rs::UTF_8).unwrap();
        assert_eq!(decoded, "Hello, 世界!");
    }

    #[test]
    fn test_decode_rejects_invalid_bytes() {
        let err = decode_to_utf8(&[0x66, 0xff, 0xfe, 0x6f], encoding_rs::UTF_8).unwrap_err();
        assert!(matches!(err, FetchError::Charset(_)));
    }

    #[test]
    fn test_process_response_records_encoding() {
        let url = Url::parse("https://example.com/articles/a").unwrap();
        let body = Bytes::from_static(b"<h1>caf\xe9</h1>");
        let page =
            process_response(url, StatusCode::OK, body, "text/html; charset=latin1").unwrap();
        assert_eq!(page.body_utf8, "<h1>café</h1>");
        assert_eq!(page.encoding, "windows-1252");
    }
}
