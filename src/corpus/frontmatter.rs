//! Frontmatter Parser
//!
//! Splits a skill document into its delimited metadata block and body, and
//! parses the block into a generic key-value mapping. The parser is
//! deliberately generic: unknown keys are preserved, not dropped, because
//! the normalizer needs to see them.
//!
//! Expected format:
//! ```text
//! ---
//! name: my-skill
//! description: Does something useful
//! license: MIT
//! ---
//!
//! Instructions go here in Markdown...
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::Metadata;

/// Frontmatter delimiter line.
const DELIMITER: &str = "---";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A malformed metadata block. Carried as data so the loader can record it
/// as a per-document load failure instead of aborting the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing opening frontmatter delimiter")]
    MissingOpeningDelimiter,
    #[error("missing closing frontmatter delimiter")]
    MissingClosingDelimiter,
    #[error("malformed frontmatter line {0}: no key separator")]
    MalformedLine(usize),
}

/// A document split into its parsed metadata and body lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub metadata: Metadata,
    pub body: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Split raw document content into parsed frontmatter and body lines.
///
/// The metadata block must open with a `---` line (leading blank lines are
/// tolerated) and close with another. A file with metadata absent is a
/// malformed input, never a zero-value document.
pub fn split_document(raw: &str) -> Result<ParsedDocument, ParseError> {
    let lines: Vec<&str> = raw.lines().collect();

    let open = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .filter(|&i| lines[i].trim_end() == DELIMITER)
        .ok_or(ParseError::MissingOpeningDelimiter)?;

    let close = lines[open + 1..]
        .iter()
        .position(|l| l.trim_end() == DELIMITER)
        .map(|i| i + open + 1)
        .ok_or(ParseError::MissingClosingDelimiter)?;

    let metadata = parse_block(&lines[open + 1..close])?;

    // Body is everything after the closing delimiter, minus leading blanks.
    let mut body: Vec<String> = lines[close + 1..].iter().map(|l| l.to_string()).collect();
    while body.first().map(|l| l.trim().is_empty()).unwrap_or(false) {
        body.remove(0);
    }

    Ok(ParsedDocument { metadata, body })
}

/// Render canonical frontmatter plus body back into file content. Inverse
/// of [`split_document`] for documents the fix mode writes back.
pub fn render_document(metadata: &Metadata, body: &[String]) -> String {
    let mut out = String::from("---\n");
    for (key, value) in metadata {
        match value {
            Value::Object(nested) => {
                out.push_str(&format!("{}:\n", key));
                for (sub_key, sub_value) in nested {
                    out.push_str(&format!("  {}: {}\n", sub_key, render_scalar(sub_value)));
                }
            }
            Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(render_scalar).collect();
                out.push_str(&format!("{}: [{}]\n", key, rendered.join(", ")));
            }
            other => out.push_str(&format!("{}: {}\n", key, render_scalar(other))),
        }
    }
    out.push_str("---\n\n");
    out.push_str(&body.join("\n"));
    if !body.is_empty() {
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Parse the lines between the delimiters into a mapping.
///
/// Supports scalar key-value pairs, single-level inline arrays using the
/// `[a, b]` syntax, and one level of indented block mapping:
///
/// ```text
/// meta:
///   name: my-skill
/// ```
fn parse_block(lines: &[&str]) -> Result<Metadata, ParseError> {
    let mut map = Map::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            i += 1;
            continue;
        }

        let colon = trimmed.find(':').ok_or(ParseError::MalformedLine(i + 1))?;
        let key = trimmed[..colon].trim().to_string();
        let raw_value = trimmed[colon + 1..].trim();

        if raw_value.is_empty() {
            // Block mapping: collect the indented children that follow.
            let mut nested = Map::new();
            while i + 1 < lines.len() && is_indented(lines[i + 1]) {
                i += 1;
                let child = lines[i].trim();
                if child.is_empty() || child.starts_with('#') {
                    continue;
                }
                let child_colon = child.find(':').ok_or(ParseError::MalformedLine(i + 1))?;
                let child_key = child[..child_colon].trim().to_string();
                let child_value = parse_scalar(child[child_colon + 1..].trim());
                nested.insert(child_key, child_value);
            }
            map.insert(key, Value::Object(nested));
        } else {
            map.insert(key, parse_scalar(raw_value));
        }

        i += 1;
    }

    Ok(map)
}

fn is_indented(line: &str) -> bool {
    !line.is_empty() && (line.starts_with(' ') || line.starts_with('\t'))
}

/// Parse a single scalar value: inline array, bool, integer, or string.
fn parse_scalar(raw: &str) -> Value {
    if raw.starts_with('[') && raw.ends_with(']') {
        let inner = &raw[1..raw.len() - 1];
        if inner.trim().is_empty() {
            return Value::Array(Vec::new());
        }
        let items: Vec<Value> = inner
            .split(',')
            .map(|s| Value::String(unquote(s.trim()).to_string()))
            .collect();
        return Value::Array(items);
    }
    if raw == "true" {
        return Value::Bool(true);
    }
    if raw == "false" {
        return Value::Bool(false);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    Value::String(unquote(raw).to_string())
}

/// Strip one matching pair of surrounding quotes.
fn unquote(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) if needs_quoting(s) => format!("\"{}\"", s),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A rendered string must re-parse as the same string. Quote values the
/// scalar parser would otherwise coerce to another type, strip quotes
/// from, or trim.
fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s == "true"
        || s == "false"
        || s.parse::<i64>().is_ok()
        || (s.starts_with('[') && s.ends_with(']'))
        || s != unquote(s)
        || s != s.trim()
}
