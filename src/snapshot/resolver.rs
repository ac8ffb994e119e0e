//! Identifier & default resolution
//!
//! Pure helpers that fill in sequence ranges and turn literal defaults into
//! PostgreSQL text. Numeric options stay strings end to end so 64-bit bounds
//! survive the round trip through JSON.

use crate::models::{LiteralValue, NumericField, SequenceOptions};
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static ARRAY_TYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d*\]").expect("valid regex"));

/// Signed range of an integer column type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityBounds {
    pub min: &'static str,
    pub max: &'static str,
}

pub const SMALLINT_BOUNDS: IdentityBounds = IdentityBounds {
    min: "-32768",
    max: "32767",
};

pub const INTEGER_BOUNDS: IdentityBounds = IdentityBounds {
    min: "-2147483648",
    max: "2147483647",
};

pub const BIGINT_BOUNDS: IdentityBounds = IdentityBounds {
    min: "-9223372036854775808",
    max: "9223372036854775807",
};

/// Fully resolved sequence options, all numeric values as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSequence {
    pub increment: String,
    pub min_value: String,
    pub max_value: String,
    pub start_with: String,
    pub cache: String,
    pub cycle: bool,
}

/// Text of a numeric option, or `None` when it was not given
pub fn numeric_field_or_default(field: Option<&NumericField>) -> Option<String> {
    field.map(|f| f.to_string())
}

/// Range of the identity column's declared type; unknown types get the 16-bit range
pub fn identity_bounds_for(sql_type: &str) -> IdentityBounds {
    match sql_type.trim().to_ascii_lowercase().as_str() {
        "integer" | "int" | "int4" => INTEGER_BOUNDS,
        "bigint" | "int8" => BIGINT_BOUNDS,
        _ => SMALLINT_BOUNDS,
    }
}

fn is_descending(increment: &str) -> bool {
    let trimmed = increment.trim();
    trimmed.starts_with('-') && trimmed.chars().any(|c| matches!(c, '1'..='9'))
}

/// Fill in every option not explicitly given.
///
/// Ascending sequences run from `1` to the type's upper bound and start at
/// their minimum; descending ones run from the lower bound to `-1` and start
/// at their maximum.
pub fn resolve_sequence_options(
    options: Option<&SequenceOptions>,
    bounds: IdentityBounds,
) -> ResolvedSequence {
    let field = |pick: fn(&SequenceOptions) -> Option<&NumericField>| {
        numeric_field_or_default(options.and_then(pick))
    };

    let increment = field(|o| o.increment.as_ref()).unwrap_or_else(|| "1".to_string());
    let descending = is_descending(&increment);

    let min_value = field(|o| o.min_value.as_ref()).unwrap_or_else(|| {
        if descending {
            bounds.min.to_string()
        } else {
            "1".to_string()
        }
    });
    let max_value = field(|o| o.max_value.as_ref()).unwrap_or_else(|| {
        if descending {
            "-1".to_string()
        } else {
            bounds.max.to_string()
        }
    });
    let start_with = field(|o| o.start_with.as_ref()).unwrap_or_else(|| {
        if descending {
            max_value.clone()
        } else {
            min_value.clone()
        }
    });
    let cache = field(|o| o.cache.as_ref()).unwrap_or_else(|| "1".to_string());
    let cycle = options.and_then(|o| o.cycle).unwrap_or(false);

    ResolvedSequence {
        increment,
        min_value,
        max_value,
        start_with,
        cache,
        cycle,
    }
}

pub fn escape_single_quotes(text: &str) -> String {
    text.replace('\'', "''")
}

/// `true` for declared array types such as `integer[]` or `text[3]`
pub fn is_array_type(sql_type: &str) -> bool {
    ARRAY_TYPE.is_match(sql_type)
}

fn format_date(date: &DateTime<Utc>, sql_type: &str) -> String {
    match sql_type {
        "date" => date.format("%Y-%m-%d").to_string(),
        "timestamp" => date.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        _ => date.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Encode a literal default for a column of `sql_type`
pub fn literal_for_value(value: &LiteralValue, sql_type: &str) -> String {
    let lowered = sql_type.to_lowercase();

    match value {
        LiteralValue::String(s) => format!("'{}'", escape_single_quotes(s)),
        _ if lowered == "json" || lowered == "jsonb" => format!(
            "'{}'::{}",
            escape_single_quotes(&value.to_json().to_string()),
            lowered
        ),
        LiteralValue::Date(d) => format!("'{}'", format_date(d, &lowered)),
        LiteralValue::Array(items) if is_array_type(&lowered) => {
            format!("'{}'", escape_single_quotes(&array_literal(items, &lowered)))
        }
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Number(n) => n.to_string(),
        LiteralValue::BigInt(s) => s.clone(),
        LiteralValue::Array(_) | LiteralValue::Object(_) => value.to_json().to_string(),
    }
}

/// Double-quoted array element with `\` and `"` backslash-escaped
fn quote_array_element(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// PostgreSQL array literal (`{1,2,3}`), nested arrays rendered recursively.
///
/// The result is not yet a SQL string: single quotes are doubled by the caller.
pub fn array_literal(items: &[LiteralValue], sql_type: &str) -> String {
    let element_type = sql_type.split('[').next().unwrap_or(sql_type).trim();

    let rendered: Vec<String> = items
        .iter()
        .map(|item| match item {
            LiteralValue::Number(n) => n.to_string(),
            LiteralValue::BigInt(s) => s.clone(),
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Array(nested) => array_literal(nested, element_type),
            LiteralValue::Date(d) => quote_array_element(&format_date(d, element_type)),
            LiteralValue::Object(map) => quote_array_element(&Value::Object(map.clone()).to_string()),
            LiteralValue::String(s) => quote_array_element(s),
        })
        .collect();

    format!("{{{}}}", rendered.join(","))
}
