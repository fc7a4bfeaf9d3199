//! Front-matter parsing
//!
//! The header understood here is a restricted, line-based subset of YAML:
//! one `key: value` pair per line between two `---` marker lines. Anything
//! that does not have exactly that shape from the first byte on is treated
//! as plain body text.

use indexmap::IndexMap;
use thiserror::Error;

const OPEN_MARKER: &str = "---\n";
const CLOSE_MARKER: &str = "\n---\n";

/// Key whose bracketed value is read as a list
const TAGS_KEY: &str = "tags";

/// A single front-matter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl MetaValue {
    /// The value as text, if it is not a list
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::List(_) => None,
        }
    }

    /// The value as a list, if it is one
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetaValue::List(items) => Some(items),
            MetaValue::Text(_) => None,
        }
    }
}

/// A document split into its metadata and body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub metadata: IndexMap<String, MetaValue>,
    pub body: String,
}

impl ParsedDocument {
    /// Parse a raw document. Never fails: input without a well-formed
    /// header comes back verbatim as the body.
    pub fn parse(raw: &str) -> Self {
        let Some((header, body)) = split_header(raw) else {
            return Self {
                metadata: IndexMap::new(),
                body: raw.to_string(),
            };
        };

        let mut metadata = IndexMap::new();
        for line in header.split('\n') {
            if let Some((key, value)) = parse_line(line) {
                metadata.insert(key, value);
            }
        }

        Self {
            metadata,
            body: body.to_string(),
        }
    }

    /// Text value for a key; lists and missing keys yield `None`
    pub fn text(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(MetaValue::as_str)
    }

    /// Tags, when the `tags` key holds a list
    pub fn tags(&self) -> Option<&[String]> {
        self.metadata.get(TAGS_KEY).and_then(MetaValue::as_list)
    }
}

/// Split `---\n<header>\n---\n<body>` into header and body
fn split_header(raw: &str) -> Option<(&str, &str)> {
    let rest = raw.strip_prefix(OPEN_MARKER)?;
    let end = rest.find(CLOSE_MARKER)?;
    Some((&rest[..end], &rest[end + CLOSE_MARKER.len()..]))
}

fn parse_line(line: &str) -> Option<(String, MetaValue)> {
    let colon = line.find(':')?;
    if colon == 0 {
        return None;
    }

    let key = line[..colon].trim();
    let value = unquote(line[colon + 1..].trim());

    if key == TAGS_KEY && value.starts_with('[') && value.ends_with(']') {
        // A loose split only fails on unbracketed input, which is ruled out above
        let tags = parse_list(value, ListSyntax::Strict)
            .or_else(|_| parse_list(value, ListSyntax::Loose))
            .unwrap_or_default();
        return Some((key.to_string(), MetaValue::List(tags)));
    }

    Some((key.to_string(), MetaValue::Text(value.to_string())))
}

/// Strip one pair of matching surrounding quotes
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.starts_with(quote) && value.ends_with(quote) {
            // A lone quote character is both the opening and closing quote
            return value.get(1..value.len() - 1).unwrap_or("");
        }
    }
    value
}

/// How strictly to read a bracketed list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSyntax {
    /// A JSON array
    Strict,
    /// Comma-separated items, each optionally quoted
    Loose,
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error("list is not enclosed in brackets")]
    NotBracketed,
    #[error("invalid JSON array: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse a bracketed list such as `[a, "b c"]`
pub fn parse_list(raw: &str, syntax: ListSyntax) -> Result<Vec<String>, ListError> {
    match syntax {
        ListSyntax::Strict => {
            let items: Vec<serde_json::Value> = serde_json::from_str(raw)?;
            Ok(items
                .into_iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect())
        }
        ListSyntax::Loose => {
            let inner = raw
                .strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
                .ok_or(ListError::NotBracketed)?;
            Ok(inner.split(',').map(strip_item).collect())
        }
    }
}

fn strip_item(item: &str) -> String {
    let item = item.trim();
    let item = item.strip_prefix(['"', '\'']).unwrap_or(item);
    let item = item.strip_suffix(['"', '\'']).unwrap_or(item);
    item.to_string()
}
