//! Permissive dialect transform and parse.

use super::include::INCLUDE_KEY;
use crate::error::{FleetError, Result};
use crate::value::{Map, Value, kind_of};
use std::path::Path;

/// One parsed layer file: its own keys plus the include references it declared.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLayer {
    /// Top-level keys other than `$include`, in file order.
    pub body: Map<String, Value>,
    /// Include references in declaration order, unresolved.
    pub includes: Vec<String>,
}

/// Parse the text of one layer file.
///
/// `path` is only used for error messages.
pub fn parse_layer(text: &str, path: &Path) -> Result<ParsedLayer> {
    let strict = to_strict_json(text);

    let value = if strict.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        serde_json::from_str::<Value>(&strict).map_err(|e| FleetError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    let Value::Object(mut body) = value else {
        return Err(FleetError::Structural(format!(
            "config layer must be a mapping, found {}: {}",
            kind_of(&value),
            path.display()
        )));
    };

    let includes = match body.shift_remove(INCLUDE_KEY) {
        None => Vec::new(),
        Some(Value::String(single)) => vec![single],
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s),
                other => Err(FleetError::Structural(format!(
                    "{}[{}] must be a string, found {}: {}",
                    INCLUDE_KEY,
                    i,
                    kind_of(&other),
                    path.display()
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(FleetError::Structural(format!(
                "{} must be a string or list of strings, found {}: {}",
                INCLUDE_KEY,
                kind_of(&other),
                path.display()
            )));
        }
    };

    Ok(ParsedLayer { body, includes })
}

/// Reduce permissive layer text to strict JSON.
///
/// Comments are stripped first, then trailing commas, then bare keys are
/// quoted. Already-strict input passes through unchanged.
pub fn to_strict_json(text: &str) -> String {
    let stripped = strip_comments(text);

    let mut normalized = remove_trailing_commas(&stripped);
    loop {
        let next = remove_trailing_commas(&normalized);
        if next == normalized {
            break;
        }
        normalized = next;
    }

    quote_bare_keys(&normalized)
}

/// Tracks whether the scanner is inside a quoted string literal.
#[derive(Debug, Default)]
struct Literal {
    quote: Option<char>,
    escaped: bool,
}

impl Literal {
    /// Feed one character; returns true when it belongs to a string literal,
    /// including its delimiting quotes.
    fn feed(&mut self, ch: char) -> bool {
        match self.quote {
            Some(quote) => {
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == quote {
                    self.quote = None;
                }
                true
            }
            None if ch == '"' || ch == '\'' => {
                self.quote = Some(ch);
                true
            }
            None => false,
        }
    }
}

fn strip_comments(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut literal = Literal::default();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if literal.feed(ch) {
            out.push(ch);
            i += 1;
            continue;
        }

        match (ch, chars.get(i + 1)) {
            ('/', Some('/')) => {
                i += 2;
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i + 1 < chars.len() && !(chars[i] == '*' && chars[i + 1] == '/') {
                    i += 1;
                }
                i += 2;
            }
            _ => {
                out.push(ch);
                i += 1;
            }
        }
    }

    out
}

/// Drop each comma whose next non-whitespace character closes an object or list.
fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut literal = Literal::default();

    for (i, &ch) in chars.iter().enumerate() {
        if literal.feed(ch) {
            out.push(ch);
            continue;
        }
        if ch == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}

fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut literal = Literal::default();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if literal.feed(ch) {
            out.push(ch);
            i += 1;
            continue;
        }

        out.push(ch);
        i += 1;
        if ch != '{' && ch != ',' {
            continue;
        }

        while i < chars.len() && chars[i].is_whitespace() {
            out.push(chars[i]);
            i += 1;
        }

        if i >= chars.len() || !is_ident_start(chars[i]) {
            continue;
        }

        let start = i;
        while i < chars.len() && is_ident_char(chars[i]) {
            i += 1;
        }
        let key: String = chars[start..i].iter().collect();

        let mut j = i;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }

        if j < chars.len() && chars[j] == ':' {
            out.push('"');
            out.push_str(&key);
            out.push('"');
            out.extend(&chars[i..j]);
            out.push(':');
            i = j + 1;
        } else {
            out.push_str(&key);
        }
    }

    out
}

/// `$` is accepted so the reserved `$include` key can be written bare.
fn is_ident_start(ch: char) -> bool {
    ch == '_' || ch == '$' || ch.is_ascii_alphabetic()
}

fn is_ident_char(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit() || ch == '-'
}
