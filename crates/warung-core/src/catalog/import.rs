//! Loose parsing of product documents (bulk import, remote catalog, snapshots).

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::ImagePath;

/// Counts reported by a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl ImportReport {
    pub const fn total(&self) -> usize {
        self.inserted + self.updated + self.skipped
    }
}

/// A product parsed from an untrusted JSON element, fields defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct LooseProduct {
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub img: ImagePath,
    /// The element carried a non-empty `img` that sanitized to nothing.
    pub unresolved_img: bool,
}

impl LooseProduct {
    /// Read an element, defaulting missing fields: price to 0, text to empty.
    ///
    /// Returns `None` for elements that are not JSON objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let raw_img = loose_string(object.get("img"));
        let img = ImagePath::parse(&raw_img);
        let unresolved_img = !raw_img.trim().is_empty() && img.is_empty();
        let id = object
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(ToOwned::to_owned);

        Some(Self {
            id,
            name: loose_string(object.get("name")).trim().to_string(),
            price: loose_price(object.get("price")),
            category: loose_string(object.get("category")).trim().to_string(),
            img,
            unresolved_img,
        })
    }

    /// Why this element may not enter the catalog through an import, if any.
    #[allow(clippy::float_cmp)]
    pub fn import_rejection(&self) -> Option<&'static str> {
        if self.name.is_empty() {
            Some("missing name")
        } else if self.price == 0.0 {
            Some("price is missing or zero")
        } else if self.price < 0.0 {
            Some("price is negative")
        } else if self.unresolved_img {
            Some("image name has no usable characters")
        } else {
            None
        }
    }
}

/// Parse a bulk import document into its top-level array elements.
///
/// Strict JSON is tried first; failing that, single quotes are read as string
/// delimiters. Anything other than an array is a [`Error::Format`].
pub fn parse_import_document(text: &str) -> Result<Vec<Value>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::Format("Import document is empty".to_string()));
    }

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(strict_error) => serde_json::from_str::<Value>(&text.replace('\'', "\""))
            .map_err(|_| Error::Format(format!("Invalid JSON: {strict_error}")))?,
    };

    match value {
        Value::Array(items) => Ok(items),
        other => Err(Error::Format(format!(
            "Import document must be a JSON array, found {}",
            json_kind(&other)
        ))),
    }
}

/// Coerce a price edit such as `"Rp 5000"` or `"12.5"` into a number.
///
/// Characters other than digits, `.` and `-` are stripped first. A `.` is
/// always a decimal point, never a thousands separator: `"Rp 5.000"` parses
/// as `5.0`, and the dot after `Rp.` survives so `"Rp. 5000"` parses as `0.5`.
pub fn parse_price_text(raw: &str) -> Result<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.' || *ch == '-')
        .collect();
    if cleaned.is_empty() {
        return Err(Error::Validation(format!("Price '{raw}' is not a number")));
    }

    let price = cleaned
        .parse::<f64>()
        .map_err(|_| Error::Validation(format!("Price '{raw}' is not a number")))?;
    validate_price(price)?;
    Ok(price)
}

/// Reject prices that are negative or not finite.
pub fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() {
        return Err(Error::Validation(format!("Price {price} is not finite")));
    }
    if price < 0.0 {
        return Err(Error::Validation(format!("Price {price} cannot be negative")));
    }
    Ok(())
}

fn loose_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn loose_price(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => parse_price_text(text).unwrap_or(0.0),
        _ => 0.0,
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_import_document_rejects_non_array() {
        let error = parse_import_document(r#"{"name": "Kopi"}"#).unwrap_err();
        assert!(matches!(error, Error::Format(_)));
        assert!(error.to_string().contains("an object"));
    }

    #[test]
    fn parse_import_document_rejects_garbage_and_empty() {
        assert!(matches!(
            parse_import_document("not json"),
            Err(Error::Format(_))
        ));
        assert!(matches!(parse_import_document("   "), Err(Error::Format(_))));
    }

    #[test]
    fn parse_import_document_accepts_single_quotes() {
        let items = parse_import_document("[{'name': 'Kopi', 'price': 5000}]").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Kopi");
    }

    #[test]
    fn parse_import_document_keeps_apostrophes_in_strict_json() {
        let items = parse_import_document(r#"[{"name": "Kopi 'Ndeso'"}]"#).unwrap();
        assert_eq!(items[0]["name"], "Kopi 'Ndeso'");
    }

    #[test]
    fn loose_product_defaults_missing_fields() {
        let product = LooseProduct::from_value(&json!({"name": "Gula"})).unwrap();
        assert_eq!(product.price, 0.0);
        assert_eq!(product.category, "");
        assert!(product.img.is_empty());
        assert!(product.id.is_none());
        assert_eq!(product.import_rejection(), Some("price is missing or zero"));
    }

    #[test]
    fn loose_product_coerces_string_price() {
        let product =
            LooseProduct::from_value(&json!({"name": "Teh", "price": "Rp 3000"})).unwrap();
        assert_eq!(product.price, 3000.0);
        assert_eq!(product.import_rejection(), None);
    }

    #[test]
    fn loose_product_flags_unresolvable_image() {
        let product =
            LooseProduct::from_value(&json!({"name": "Teh", "price": 1, "img": "???"})).unwrap();
        assert_eq!(
            product.import_rejection(),
            Some("image name has no usable characters")
        );
    }

    #[test]
    fn loose_product_ignores_non_objects() {
        assert!(LooseProduct::from_value(&json!("Kopi")).is_none());
        assert!(LooseProduct::from_value(&json!(42)).is_none());
    }

    #[test]
    fn parse_price_text_strips_noise() {
        assert_eq!(parse_price_text("Rp 5000").unwrap(), 5000.0);
        assert_eq!(parse_price_text(" 12.5 ").unwrap(), 12.5);
    }

    #[test]
    fn parse_price_text_reads_dot_as_decimal_point() {
        assert_eq!(parse_price_text("Rp 5.000").unwrap(), 5.0);
        assert_eq!(parse_price_text("Rp. 5000").unwrap(), 0.5);
    }

    #[test]
    fn parse_price_text_rejects_non_numbers() {
        assert!(matches!(parse_price_text("abc"), Err(Error::Validation(_))));
        assert!(matches!(parse_price_text("1.2.3"), Err(Error::Validation(_))));
        assert!(matches!(parse_price_text("-5"), Err(Error::Validation(_))));
    }
}
