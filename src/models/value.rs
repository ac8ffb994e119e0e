//! Column default values
//!
//! A default is either a literal the serializer has to encode for the target
//! column type, or raw SQL that is passed through untouched. In JSON a raw
//! default is written `{"$sql": "now()"}`; dates and 64-bit integers that must
//! not lose precision are written `{"$date": "..."}` and `{"$bigint": "..."}`.
//! Every other JSON value is a literal.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

const SQL_KEY: &str = "$sql";
const DATE_KEY: &str = "$date";
const BIGINT_KEY: &str = "$bigint";

/// Default value attached to a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum DefaultValue {
    Literal(LiteralValue),
    RawSql(String),
}

/// Literal scalar, array or object default
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(Number),
    BigInt(String),
    Bool(bool),
    Date(DateTime<Utc>),
    Array(Vec<LiteralValue>),
    Object(Map<String, Value>),
}

impl LiteralValue {
    /// JSON form used when the literal ends up inside a JSON document
    pub fn to_json(&self) -> Value {
        match self {
            LiteralValue::String(s) => Value::String(s.clone()),
            LiteralValue::Number(n) => Value::Number(n.clone()),
            LiteralValue::BigInt(s) => Value::String(s.clone()),
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Date(d) => Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            LiteralValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            LiteralValue::Object(map) => Value::Object(map.clone()),
        }
    }
}

fn single_key<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if map.len() == 1 {
        map.get(key)
    } else {
        None
    }
}

impl TryFrom<Value> for LiteralValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Err("null is not a literal default, use {\"$sql\": \"NULL\"}".to_string()),
            Value::Bool(b) => Ok(LiteralValue::Bool(b)),
            Value::Number(n) => Ok(LiteralValue::Number(n)),
            Value::String(s) => Ok(LiteralValue::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(LiteralValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(LiteralValue::Array),
            Value::Object(map) => {
                if let Some(raw) = single_key(&map, DATE_KEY) {
                    let text = raw
                        .as_str()
                        .ok_or_else(|| format!("{} must be a string", DATE_KEY))?;
                    let parsed = DateTime::parse_from_rfc3339(text)
                        .map_err(|e| format!("invalid {} value '{}': {}", DATE_KEY, text, e))?;
                    return Ok(LiteralValue::Date(parsed.with_timezone(&Utc)));
                }
                if let Some(raw) = single_key(&map, BIGINT_KEY) {
                    return match raw {
                        Value::String(s) => Ok(LiteralValue::BigInt(s.clone())),
                        Value::Number(n) => Ok(LiteralValue::BigInt(n.to_string())),
                        _ => Err(format!("{} must be a string or number", BIGINT_KEY)),
                    };
                }
                Ok(LiteralValue::Object(map))
            }
        }
    }
}

impl TryFrom<Value> for DefaultValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Object(map) = &value {
            if let Some(raw) = single_key(map, SQL_KEY) {
                let sql = raw
                    .as_str()
                    .ok_or_else(|| format!("{} must be a string", SQL_KEY))?;
                return Ok(DefaultValue::RawSql(sql.to_string()));
            }
        }
        LiteralValue::try_from(value).map(DefaultValue::Literal)
    }
}

impl From<LiteralValue> for Value {
    fn from(literal: LiteralValue) -> Self {
        let mut tagged = Map::new();
        match literal {
            LiteralValue::BigInt(s) => {
                tagged.insert(BIGINT_KEY.to_string(), Value::String(s));
                Value::Object(tagged)
            }
            LiteralValue::Date(d) => {
                tagged.insert(
                    DATE_KEY.to_string(),
                    Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
                );
                Value::Object(tagged)
            }
            LiteralValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            other => other.to_json(),
        }
    }
}

impl From<DefaultValue> for Value {
    fn from(default: DefaultValue) -> Self {
        match default {
            DefaultValue::Literal(literal) => literal.into(),
            DefaultValue::RawSql(sql) => {
                let mut tagged = Map::new();
                tagged.insert(SQL_KEY.to_string(), Value::String(sql));
                Value::Object(tagged)
            }
        }
    }
}
