//! Serializer.
//!
//! Rebuilds a document from its raw text, replacing only the `kind:` value
//! and the indexed data value spans.

use serde_yaml::Value;

use crate::core::manifest::object::Object;
use crate::core::types::Span;
use crate::error::{Error, Result};

/// Words YAML 1.1 readers (Kubernetes tooling) treat as booleans or null.
const YAML11_WORDS: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "true", "True", "TRUE", "false",
    "False", "FALSE", "on", "On", "ON", "off", "Off", "OFF", "null", "Null", "NULL", "~",
];

/// Render one object back to text.
///
/// Foreign objects and objects without data come back as their exact raw
/// text.
///
/// # Errors
///
/// Returns `Error::InvariantViolation` if an indexed key has no value.
pub fn render_object(obj: &Object) -> Result<String> {
    let (Some(layout), Some(data)) = (obj.layout(), obj.data()) else {
        return Ok(obj.raw().to_string());
    };
    let raw = obj.raw();

    let mut edits: Vec<(Span, String)> = Vec::with_capacity(layout.keys.len() + 1);
    edits.push((layout.kind.clone(), obj.kind().to_string()));
    for loc in &layout.keys {
        let value = data.get(&loc.key).ok_or_else(|| {
            Error::InvariantViolation(format!("no value for indexed key '{}'", loc.key))
        })?;
        edits.push((loc.span.clone(), render_value(value, loc.block_indent)?));
    }
    edits.sort_by_key(|(span, _)| span.start);

    let mut out = String::with_capacity(raw.len());
    let mut cursor = 0;
    for (span, text) in edits {
        out.push_str(&raw[cursor..span.start]);
        out.push_str(&text);
        cursor = span.end;
    }
    out.push_str(&raw[cursor..]);
    Ok(out)
}

/// Render a value for the position right after `key: `.
///
/// Multi-line values become a `|` block scalar with lines at `block_indent`
/// columns when the block reads back as the same string. Everything else
/// YAML would not read back as itself is double-quoted on one line.
pub fn render_value(value: &str, block_indent: usize) -> Result<String> {
    if value.contains('\n') && fits_block(value) {
        let body = &value[..value.len() - 1];
        let pad = " ".repeat(block_indent);
        let mut out = String::from("|");
        for line in body.split('\n') {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&pad);
                out.push_str(line);
            }
        }
        return Ok(out);
    }

    if value.contains('\n') || needs_quotes(value) {
        return quote(value);
    }
    Ok(value.to_string())
}

/// Whether a `|` block with clip chomping reproduces `value` exactly.
///
/// The first line fixes the block's indentation, clipping keeps exactly
/// one final newline, and only printable characters may appear.
fn fits_block(value: &str) -> bool {
    let Some(body) = value.strip_suffix('\n') else {
        return false;
    };
    if body.ends_with('\n') || body.chars().any(|c| c != '\n' && !is_printable(c)) {
        return false;
    }
    let first = body.split('\n').next().unwrap_or_default();
    let last = body.rsplit('\n').next().unwrap_or_default();
    !first.is_empty()
        && !first.starts_with([' ', '\t'])
        && !last.trim().is_empty()
}

/// Double-quote `value` on one line.
///
/// JSON escaping is valid YAML; characters YAML readers reject or treat as
/// line breaks are escaped on top of it.
fn quote(value: &str) -> Result<String> {
    let json = serde_json::to_string(value)
        .map_err(|e| Error::InvariantViolation(format!("cannot quote value: {}", e)))?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if is_printable(c) {
            out.push(c);
        } else {
            out.push_str(&format!("\\u{:04x}", c as u32));
        }
    }
    Ok(out)
}

/// Characters YAML accepts unescaped inside a scalar on one line.
fn is_printable(c: char) -> bool {
    match c {
        '\t' | ' '..='~' => true,
        '\u{2028}' | '\u{2029}' | '\u{feff}' => false,
        '\u{a0}'..='\u{d7ff}' | '\u{e000}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}' => true,
        _ => false,
    }
}

/// Whether a single-line value must be quoted to read back as itself.
pub fn needs_quotes(value: &str) -> bool {
    if value.is_empty() || YAML11_WORDS.contains(&value) || is_yaml11_number(value) {
        return true;
    }
    !matches!(serde_yaml::from_str::<Value>(value), Ok(Value::String(s)) if s == value)
}

/// Integer and float forms YAML 1.1 accepts beyond the 1.2 core schema
/// (underscores, binary, sexagesimal).
fn is_yaml11_number(value: &str) -> bool {
    let digits = value.trim_start_matches(['+', '-']);
    if digits.is_empty() {
        return false;
    }
    if let Some(bin) = digits.strip_prefix("0b") {
        return !bin.is_empty() && bin.chars().all(|c| matches!(c, '0' | '1' | '_'));
    }
    let plain = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '_');
    if digits.contains(':') {
        return digits.split(':').all(plain);
    }
    match digits.split_once('.') {
        Some((int, frac)) => (int.is_empty() || plain(int)) && (frac.is_empty() || plain(frac)),
        None => plain(digits),
    }
}
