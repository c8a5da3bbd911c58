//! Charset extraction and UTF-8 normalization of upstream bodies.
//!
//! The upstream declares its encoding in the `Content-Type` header
//! (historically `ISO-8859-1` for this API). [`charset_from_content_type`]
//! pulls out the `charset=` token; [`normalize_to_utf8`] decodes the
//! raw body under that label. UTF-8 input is decoded directly, with
//! U+FFFD replacement for invalid sequences; every other label goes
//! through the WHATWG label registry in `encoding_rs`. A label the
//! registry does not know is an error, never a silent mis-decode.

use encoding_rs::Encoding;

use crate::error::DecodingError;

/// Fallback when the upstream omits the charset entirely.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// Extract the lowercased `charset=` token from a `Content-Type`
/// value. An absent header, an absent token, or an empty token all
/// yield [`DEFAULT_CHARSET`]. Surrounding whitespace and quotes are
/// stripped; matching is case-insensitive.
#[must_use]
pub fn charset_from_content_type(content_type: Option<&str>) -> String {
    let Some(content_type) = content_type else {
        return DEFAULT_CHARSET.to_string();
    };

    content_type
        .split(';')
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .map(|(_, value)| value.trim().trim_matches('"').to_ascii_lowercase())
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| DEFAULT_CHARSET.to_string())
}

/// Decode `body` under the given charset label into UTF-8 text.
///
/// `utf-8`/`utf8` (case-insensitive) decode directly. Any other label
/// is resolved through the WHATWG registry and transcoded; unmappable
/// bytes become U+FFFD, matching the permissive behavior of the
/// decoders legacy regional APIs are written against.
pub fn normalize_to_utf8(body: &[u8], charset: &str) -> Result<String, DecodingError> {
    if charset.eq_ignore_ascii_case("utf-8") || charset.eq_ignore_ascii_case("utf8") {
        return Ok(String::from_utf8_lossy(body).into_owned());
    }

    let Some(encoding) = Encoding::for_label(charset.trim().as_bytes()) else {
        return Err(DecodingError {
            label: charset.to_string(),
        });
    };

    let (text, _, _) = encoding.decode(body);
    Ok(text.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_header_defaults_to_utf8() {
        assert_eq!(charset_from_content_type(None), "utf-8");
    }

    #[test]
    fn header_without_charset_defaults_to_utf8() {
        assert_eq!(charset_from_content_type(Some("application/xml")), "utf-8");
    }

    #[test]
    fn charset_token_is_extracted_and_lowercased() {
        assert_eq!(
            charset_from_content_type(Some("application/xml; charset=ISO-8859-1")),
            "iso-8859-1"
        );
    }

    #[test]
    fn charset_name_matching_is_case_insensitive() {
        assert_eq!(
            charset_from_content_type(Some("text/xml; Charset=UTF-8")),
            "utf-8"
        );
    }

    #[test]
    fn quoted_charset_is_unquoted() {
        assert_eq!(
            charset_from_content_type(Some("text/xml; charset=\"windows-1252\"; boundary=x")),
            "windows-1252"
        );
    }

    #[test]
    fn empty_charset_token_defaults() {
        assert_eq!(charset_from_content_type(Some("text/xml; charset=")), "utf-8");
    }

    #[test]
    fn latin1_bytes_transcode_to_utf8() {
        // "réservé" with 0xE9 for é under Latin-1
        let body = b"r\xE9serv\xE9";
        let text = normalize_to_utf8(body, "iso-8859-1").unwrap();
        assert_eq!(text, "réservé");
    }

    #[test]
    fn windows_1252_specific_bytes_transcode() {
        // 0x80 is € in windows-1252, undefined in true Latin-1
        let text = normalize_to_utf8(b"\x80100", "windows-1252").unwrap();
        assert_eq!(text, "€100");
    }

    #[test]
    fn utf8_passes_through_unchanged() {
        let body = "déjà <xml/>".as_bytes();
        assert_eq!(normalize_to_utf8(body, "utf-8").unwrap(), "déjà <xml/>");
        assert_eq!(normalize_to_utf8(body, "UTF8").unwrap(), "déjà <xml/>");
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let text = normalize_to_utf8(b"ok\xFF", "utf-8").unwrap();
        assert_eq!(text, "ok\u{FFFD}");
    }

    #[test]
    fn unknown_label_is_an_error() {
        let err = normalize_to_utf8(b"data", "x-klingon").unwrap_err();
        assert_eq!(err.label, "x-klingon");
    }
}
