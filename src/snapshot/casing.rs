//! Column name casing
//!
//! Columns whose database name was derived from the authoring key can be
//! re-cased for the database. Constraint names built from those columns then
//! have to be rewritten to match.

use crate::models::{ColumnDescriptor, TableDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Casing policy applied to key-derived column names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Casing {
    #[serde(rename = "snake_case")]
    SnakeCase,
    #[serde(rename = "camelCase")]
    CamelCase,
}

impl Casing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Casing::SnakeCase => "snake_case",
            Casing::CamelCase => "camelCase",
        }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Casing::SnakeCase => to_snake_case(input),
            Casing::CamelCase => to_camel_case(input),
        }
    }
}

impl fmt::Display for Casing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Casing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "snake_case" | "snake" => Ok(Casing::SnakeCase),
            "camelCase" | "camel" => Ok(Casing::CamelCase),
            other => Err(format!(
                "unknown casing '{}', expected snake_case or camelCase",
                other
            )),
        }
    }
}

/// Split an identifier into words.
///
/// A word is a run of lowercase letters and digits, a run of capitals not
/// followed by a lowercase letter, or a capital followed by lowercase letters
/// and digits. Apostrophes are dropped first; everything else separates words.
pub fn words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().filter(|c| *c != '\'' && *c != '\u{2019}').collect();
    let is_lower = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

    let mut words = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if is_lower(c) {
            let start = i;
            while i < chars.len() && is_lower(chars[i]) {
                i += 1;
            }
            words.push(chars[start..i].iter().collect());
        } else if c.is_ascii_uppercase() {
            let start = i;
            let mut end = i;
            while end < chars.len() && chars[end].is_ascii_uppercase() {
                end += 1;
            }
            let followed_by_lower = chars.get(end).is_some_and(|n| n.is_ascii_lowercase());

            if !followed_by_lower {
                i = end;
            } else if end - start > 1 {
                // the last capital starts the next word
                i = end - 1;
            } else {
                i = end;
                while i < chars.len() && is_lower(chars[i]) {
                    i += 1;
                }
            }
            words.push(chars[start..i].iter().collect());
        } else {
            i += 1;
        }
    }
    words
}

pub fn to_snake_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

pub fn to_camel_case(input: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(input).iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

/// Database name of a column under the given casing policy
pub fn column_name(column: &ColumnDescriptor, casing: Option<Casing>) -> String {
    match casing {
        Some(casing) if column.key_as_name => casing.apply(&column.name),
        _ => column.name.clone(),
    }
}

/// Cased name of a column referenced by its declared name.
///
/// Unknown columns are passed through as written.
pub fn referenced_column_name(table: Option<&TableDescriptor>, name: &str, casing: Option<Casing>) -> String {
    table
        .and_then(|t| t.column(name))
        .map(|c| column_name(c, casing))
        .unwrap_or_else(|| name.to_string())
}

/// `(declared, cased)` pairs for every column of `table` the casing renames
pub fn column_renames(table: &TableDescriptor, casing: Option<Casing>) -> Vec<(String, String)> {
    table
        .columns
        .iter()
        .filter_map(|c| {
            let cased = column_name(c, casing);
            (cased != c.name).then(|| (c.name.clone(), cased))
        })
        .collect()
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Replace column names inside a declared constraint name.
///
/// A column name only matches on whole tokens: it has to start and end at the
/// edge of `name` or next to a non-alphanumeric character. Longer names are
/// tried first so `user_id` wins over `user`.
pub fn rewrite_declared_name(name: &str, renames: &[(String, String)]) -> String {
    if renames.is_empty() {
        return name.to_string();
    }

    let mut ordered: Vec<&(String, String)> = renames.iter().filter(|(from, _)| !from.is_empty()).collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(name.len());
    let mut prev: Option<char> = None;
    let mut pos = 0;

    while pos < name.len() {
        let rest = &name[pos..];
        let at_boundary = prev.map_or(true, |c| !is_token_char(c));

        let hit = if at_boundary {
            ordered.iter().find(|(from, _)| {
                rest.starts_with(from.as_str())
                    && rest[from.len()..].chars().next().map_or(true, |c| !is_token_char(c))
            })
        } else {
            None
        };

        match hit {
            Some((from, to)) => {
                out.push_str(to);
                prev = from.chars().last();
                pos += from.len();
            }
            None => {
                // rest is non-empty and pos sits on a char boundary
                let Some(c) = rest.chars().next() else { break };
                out.push(c);
                prev = Some(c);
                pos += c.len_utf8();
            }
        }
    }
    out
}
