//! Text decoding and name-casing helpers.

use std::borrow::Cow;

use memchr::memmem;

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the hint encoding (from `<meta charset>`)
/// 3. Falls back to Windows-1252, which browsers assume for legacy pages
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);
    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Find the charset declared by a `<meta charset>` or
/// `<meta http-equiv="Content-Type" content="...; charset=...">` tag.
///
/// Like a browser's prescan, only the first 1024 bytes are examined.
pub fn extract_meta_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];
    let lowered = prefix.to_ascii_lowercase();

    let meta = memmem::find(&lowered, b"<meta")?;
    let offset = meta + memmem::find(&lowered[meta..], b"charset=")? + b"charset=".len();
    let rest = &prefix[offset..];

    let (start, terminators): (usize, &[u8]) = match rest.first()? {
        b'"' => (1, &b"\""[..]),
        b'\'' => (1, &b"'"[..]),
        _ => (0, &b"\"'; />\t\n\r"[..]),
    };
    let value = &rest[start..];
    let end = value
        .iter()
        .position(|b| terminators.contains(b))
        .unwrap_or(value.len());

    std::str::from_utf8(&value[..end])
        .ok()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// `fooBar` -> `foo-bar`, as the DOM maps dataset and style property names.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `foo-bar` -> `fooBar`. A dash not followed by a lowercase letter is kept.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(next) if c == '-' && next.is_ascii_lowercase() => {
                let upper = next.to_ascii_uppercase();
                chars.next();
                out.push(upper);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Attribute name behind `dataset[name]`: `fooBar` -> `data-foo-bar`.
pub fn data_attribute_name(name: &str) -> String {
    format!("data-{}", to_kebab_case(name))
}

/// CSS property name for a style key, accepting both `backgroundColor` and
/// `background-color`.
pub fn css_property_name(name: &str) -> String {
    let name = name.trim();
    if name.starts_with("--") {
        // custom properties are case-sensitive
        return name.to_string();
    }
    if name.contains('-') {
        return name.to_ascii_lowercase();
    }
    to_kebab_case(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_and_fallback() {
        assert_eq!(decode_text("héllo".as_bytes(), None), "héllo");
        // 0xE9 is 'é' in Windows-1252 and invalid as lone UTF-8
        assert_eq!(decode_text(b"caf\xE9", None), "café");
        assert_eq!(decode_text(b"caf\xE9", Some("iso-8859-1")), "café");
    }

    #[test]
    fn test_extract_meta_charset() {
        assert_eq!(
            extract_meta_charset(br#"<html><head><meta charset="windows-1251">"#),
            Some("windows-1251")
        );
        assert_eq!(
            extract_meta_charset(b"<META CHARSET=utf-8>"),
            Some("utf-8")
        );
        assert_eq!(
            extract_meta_charset(
                br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#
            ),
            Some("ISO-8859-1")
        );
        assert_eq!(extract_meta_charset(b"<p>charset=utf-8</p>"), None);
        assert_eq!(extract_meta_charset(b""), None);
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(to_kebab_case("backgroundColor"), "background-color");
        assert_eq!(to_kebab_case("color"), "color");
        assert_eq!(to_camel_case("foo-bar-baz"), "fooBarBaz");
        assert_eq!(to_camel_case("foo-1"), "foo-1");
        assert_eq!(data_attribute_name("userId"), "data-user-id");
        assert_eq!(css_property_name("fontSize"), "font-size");
        assert_eq!(css_property_name("FONT-SIZE"), "font-size");
        assert_eq!(css_property_name("--Main"), "--Main");
    }
}
