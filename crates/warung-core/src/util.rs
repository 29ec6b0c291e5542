//! Shared utility functions used across multiple modules.

use std::sync::LazyLock;

use regex::Regex;

/// Characters that may never appear in a stored image file name.
static FORBIDDEN_FILE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[:/\\?%*|"<>]"#).expect("valid file name regex"));

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Strip path separators and shell-hostile characters from a file name.
///
/// Removes `: / \ ? % * | " < >` and trims surrounding whitespace.
///
/// ```
/// use warung_core::util::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name(" kopi:susu?.jpg "), "kopisusu.jpg");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    FORBIDDEN_FILE_NAME_CHARS
        .replace_all(name, "")
        .trim()
        .to_string()
}

/// Coerce optional text into a display string; `None` renders as empty.
pub fn display_text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Render a price without a trailing fractional part when it is integral.
#[allow(clippy::cast_possible_truncation)]
pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 && price.abs() < 1e15 {
        format!("{}", price as i64)
    } else {
        format!("{price}")
    }
}

/// Build an image search URL for a product name.
pub fn image_search_url(name: &str) -> String {
    format!(
        "https://www.google.com/search?tbm=isch&q={}",
        urlencoding::encode(name.trim())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" https://example.com ".to_string())),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn is_http_url_accepts_valid_schemes() {
        assert!(is_http_url("http://localhost"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
    }

    #[test]
    fn sanitize_file_name_strips_forbidden_characters() {
        assert_eq!(sanitize_file_name(r#"a:b/c\d?e%f*g|h"i<j>k.png"#), "abcdefghijk.png");
        assert_eq!(sanitize_file_name("  teh manis.jpg "), "teh manis.jpg");
        assert_eq!(sanitize_file_name("///"), "");
    }

    #[test]
    fn format_price_drops_integral_fraction() {
        assert_eq!(format_price(5000.0), "5000");
        assert_eq!(format_price(2500.5), "2500.5");
        assert_eq!(format_price(0.0), "0");
    }

    #[test]
    fn display_text_coerces_none_to_empty() {
        assert_eq!(display_text(None), "");
        assert_eq!(display_text(Some("Kopi")), "Kopi");
    }

    #[test]
    fn image_search_url_encodes_name() {
        assert_eq!(
            image_search_url("Kopi Susu"),
            "https://www.google.com/search?tbm=isch&q=Kopi%20Susu"
        );
    }
}
