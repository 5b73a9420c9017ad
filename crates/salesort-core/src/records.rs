//! Validated sales records and the per-line parse step that produces them.
//!
//! Nothing past the loader boundary sees raw input: a line either becomes a
//! [`SalesRecord`] or is rejected with a [`SkipReason`].

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::ConfigError;

/// Numeric product identifier as exported by the store (`^\d+$`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(String);

impl ProductId {
    /// Parses a raw identifier. Surrounding whitespace is ignored; anything
    /// other than one or more ASCII digits is rejected.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(trimmed.to_owned()))
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesRecord {
    pub product_title: String,
    pub product_id: Option<ProductId>,
    pub quantity_sold: i64,
}

/// Why an input line was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InvalidJson,
    InvalidUtf8,
    MissingTitle,
    InvalidQuantity,
    InvalidProductId,
    MalformedRow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SkipReason::InvalidJson => "invalid_json",
            SkipReason::InvalidUtf8 => "invalid_utf8",
            SkipReason::MissingTitle => "missing_title",
            SkipReason::InvalidQuantity => "invalid_quantity",
            SkipReason::InvalidProductId => "invalid_product_id",
            SkipReason::MalformedRow => "malformed_row",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    JsonLines,
}

impl InputFormat {
    /// Infers the format from the file extension (`.csv`, `.jsonl`, `.ndjson`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("jsonl" | "ndjson") => Ok(InputFormat::JsonLines),
            _ => Err(ConfigError::UnknownFormat {
                path: path.display().to_string(),
            }),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => f.write_str("csv"),
            InputFormat::JsonLines => f.write_str("jsonl"),
        }
    }
}

/// Parses one JSON Lines entry. Anything other than a JSON object is
/// `InvalidJson`.
///
/// `product_id` may be a digit string or a JSON integer; absent, `null` or an
/// empty string all mean "no identifier". `net_items_sold` may be a string or
/// an integer.
///
/// # Errors
///
/// Returns the [`SkipReason`] describing why the line cannot be used.
pub fn parse_json_line(line: &str) -> Result<SalesRecord, SkipReason> {
    let Ok(Value::Object(mut fields)) = serde_json::from_str::<Value>(line) else {
        return Err(SkipReason::InvalidJson);
    };

    let title = match fields.remove("product_title") {
        Some(Value::String(s)) => Some(s),
        _ => None,
    };
    let product_id = match fields.remove("product_id") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if n.is_u64() => Some(n.to_string()),
        Some(_) => return Err(SkipReason::InvalidProductId),
    };
    let quantity = match fields.remove("net_items_sold") {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    parse_fields(title.as_deref(), product_id.as_deref(), quantity.as_deref())
}

/// Validates already-extracted string fields into a [`SalesRecord`].
///
/// Shared by the CSV and JSON Lines readers.
pub(crate) fn parse_fields(
    title: Option<&str>,
    product_id: Option<&str>,
    quantity: Option<&str>,
) -> Result<SalesRecord, SkipReason> {
    let product_title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(SkipReason::MissingTitle)?
        .to_owned();

    let quantity_sold = quantity
        .map(str::trim)
        .and_then(|q| q.parse::<i64>().ok())
        .ok_or(SkipReason::InvalidQuantity)?;

    let product_id = match product_id.map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(ProductId::parse(raw).ok_or(SkipReason::InvalidProductId)?),
    };

    Ok(SalesRecord {
        product_title,
        product_id,
        quantity_sold,
    })
}
