//! Byte-range indexer.
//!
//! Finds where the `kind:` value, the `data:` block, and each data value
//! live inside a document's raw text, so values can be replaced without
//! re-emitting (and reformatting) the rest of the document.
//!
//! This is a constrained line scanner, not a YAML parser. It understands the
//! shapes secret manifests actually use: a top-level `kind:` line and a
//! top-level `data:` block holding a flat map of string values, each either
//! a scalar on the key's line or a `|` block scalar.

use tracing::trace;

use crate::core::constants::BLOCK_INDENT;
use crate::core::types::{SecretKey, Span};
use crate::error::{ManifestError, Result};

/// Location of one data value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLoc {
    /// The data key.
    pub key: SecretKey,
    /// Byte range of the value text only (no key, no indentation).
    pub span: Span,
    /// Column at which block scalar lines for this key are written.
    pub block_indent: usize,
}

/// Byte ranges of the interesting parts of one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    /// The `kind:` value.
    pub kind: Span,
    /// The whole `data:` block, from the `data:` line to its last entry line.
    pub data: Option<Span>,
    /// One entry per data key, in document order.
    pub keys: Vec<KeyLoc>,
}

impl Layout {
    /// Location of a single key.
    pub fn key(&self, key: &str) -> Option<&KeyLoc> {
        self.keys.iter().find(|loc| loc.key == key)
    }
}

/// One line of the document, without its line terminator.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    start: usize,
    text: &'a str,
}

impl Line<'_> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }

    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }

    fn is_comment(&self) -> bool {
        self.text.trim_start().starts_with('#')
    }

    /// Starts at column zero with real content (a new top-level field).
    fn is_top_level(&self) -> bool {
        !self.is_blank() && !self.text.starts_with([' ', '\t']) && !self.is_comment()
    }
}

fn lines(raw: &str) -> Vec<Line<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    for chunk in raw.split_inclusive('\n') {
        let text = chunk.strip_suffix('\n').unwrap_or(chunk);
        let text = text.strip_suffix('\r').unwrap_or(text);
        out.push(Line { start, text });
        start += chunk.len();
    }
    out
}

/// Locate the kind, data block and value spans in one document.
///
/// # Errors
///
/// - `ManifestError::MissingKind` if there is no top-level `kind:` line.
/// - `ManifestError::KeysParse` if the data block holds content that is not
///   a flat `key: value` map.
/// - `ManifestError::UnsupportedBlockScalar` for block styles other than `|`.
pub fn locate(raw: &str) -> Result<Layout> {
    let lines = lines(raw);

    let kind = lines
        .iter()
        .find_map(|line| {
            let rest = line.text.strip_prefix("kind:")?;
            let value_start = line.text.len() - rest.trim_start().len();
            let value_len = plain_len(&line.text[value_start..]);
            Some(line.start + value_start..line.start + value_start + value_len)
        })
        .ok_or(ManifestError::MissingKind)?;

    let Some(data_idx) = lines
        .iter()
        .position(|line| line.text.starts_with("data:"))
    else {
        trace!("no data block");
        return Ok(Layout {
            kind,
            data: None,
            keys: Vec::new(),
        });
    };

    let header = lines[data_idx];
    let inline = strip_comment(&header.text["data:".len()..]).trim();
    let end_idx = lines[data_idx + 1..]
        .iter()
        .position(|line| line.is_top_level())
        .map_or(lines.len(), |p| data_idx + 1 + p);

    match inline {
        "" => {}
        "{}" => {
            return Ok(Layout {
                kind,
                data: Some(header.start..header.end()),
                keys: Vec::new(),
            });
        }
        other => {
            return Err(ManifestError::KeysParse(format!(
                "inline data map '{}' is not supported, use one key per line",
                other
            ))
            .into());
        }
    }

    let body = &lines[data_idx + 1..end_idx];
    let keys = scan_entries(body, data_idx + 2)?;

    let data_end = body
        .iter()
        .rev()
        .find(|line| !line.is_blank())
        .map_or(header.end(), |line| line.end());

    trace!(keys = keys.len(), "indexed data block");
    Ok(Layout {
        kind,
        data: Some(header.start..data_end),
        keys,
    })
}

/// Scan the entries of a data block. `first_line_no` is the 1-based line
/// number of `body[0]`, used in error messages.
fn scan_entries(body: &[Line<'_>], first_line_no: usize) -> Result<Vec<KeyLoc>> {
    let mut keys = Vec::new();
    let mut key_indent = None;
    let mut saw_content = false;
    let mut i = 0;

    while i < body.len() {
        let line = body[i];
        let line_no = first_line_no + i;
        if line.is_blank() || line.is_comment() {
            i += 1;
            continue;
        }
        saw_content = true;

        let indent = line.indent();
        let rest = &line.text[indent..];
        if rest.starts_with('\t') {
            return Err(keys_error(line_no, "tab indentation"));
        }
        match key_indent {
            None => key_indent = Some(indent),
            Some(expected) if expected != indent => {
                return Err(keys_error(
                    line_no,
                    "unexpected indentation (nested values are not supported)",
                ));
            }
            Some(_) => {}
        }

        let (key, value_offset) = split_key(rest).ok_or_else(|| {
            keys_error(line_no, "expected 'key: value'")
        })?;
        let value_start = indent + value_offset;
        let value = &line.text[value_start..];

        if value.starts_with(['|', '>']) {
            let indicator = strip_comment(value).trim_end();
            if indicator != "|" {
                return Err(ManifestError::UnsupportedBlockScalar {
                    key,
                    indicator: indicator.to_string(),
                }
                .into());
            }
            let (span_end, block_indent, consumed) =
                scan_block(&body[i + 1..], indent, line.start + value_start + 1);
            keys.push(KeyLoc {
                key,
                span: line.start + value_start..span_end,
                block_indent: block_indent.unwrap_or(indent + BLOCK_INDENT),
            });
            i += 1 + consumed;
            continue;
        }

        if value.is_empty() {
            return Err(keys_error(line_no, &format!("key '{}' has no value", key)));
        }
        let len = scalar_len(value).ok_or_else(|| {
            keys_error(line_no, &format!("unterminated quoted value for key '{}'", key))
        })?;
        keys.push(KeyLoc {
            key,
            span: line.start + value_start..line.start + value_start + len,
            block_indent: indent + BLOCK_INDENT,
        });
        i += 1;
    }

    if saw_content && keys.is_empty() {
        return Err(ManifestError::KeysParse("no key/value pairs found in data block".into()).into());
    }
    Ok(keys)
}

/// Scan the lines of a `|` block scalar following a key at `key_indent`.
///
/// Returns the absolute end of the last content line (or `empty_end` when
/// the block has no content), the content indentation, and how many lines
/// were consumed.
fn scan_block(rest: &[Line<'_>], key_indent: usize, empty_end: usize) -> (usize, Option<usize>, usize) {
    let Some(first) = rest.iter().find(|line| !line.is_blank()) else {
        return (empty_end, None, 0);
    };
    let content_indent = first.indent();
    if content_indent <= key_indent {
        return (empty_end, None, 0);
    }

    let mut end = empty_end;
    let mut consumed = 0;
    for (n, line) in rest.iter().enumerate() {
        if line.is_blank() {
            continue;
        }
        if line.indent() < content_indent {
            break;
        }
        end = line.end();
        consumed = n + 1;
    }
    (end, Some(content_indent), consumed)
}

/// Split `key: value`, returning the unquoted key and the offset of the value.
fn split_key(rest: &str) -> Option<(SecretKey, usize)> {
    let bytes = rest.as_bytes();
    let colon = match bytes.first()? {
        q @ (b'"' | b'\'') => {
            let close = quoted_len(rest, *q)?;
            (bytes.get(close) == Some(&b':')).then_some(close)?
        }
        b'-' if matches!(bytes.get(1), Some(b' ') | None) => return None,
        _ => (0..bytes.len()).find(|&i| {
            bytes[i] == b':' && matches!(bytes.get(i + 1), Some(b' ' | b'\t') | None)
        })?,
    };

    let raw_key = rest[..colon].trim_end();
    if raw_key.is_empty() {
        return None;
    }
    let key = if raw_key.starts_with(['"', '\'']) {
        serde_yaml::from_str::<String>(raw_key).ok()?
    } else {
        raw_key.to_string()
    };

    let after = &rest[colon + 1..];
    let value_offset = colon + 1 + (after.len() - after.trim_start().len());
    Some((key, value_offset))
}

/// Length of the scalar token at the start of `value`, or `None` for an
/// unterminated quoted scalar.
fn scalar_len(value: &str) -> Option<usize> {
    match value.as_bytes()[0] {
        q @ (b'"' | b'\'') => quoted_len(value, q),
        _ => Some(plain_len(value)),
    }
}

/// Length of a plain scalar: up to a ` #` comment, trailing space trimmed.
fn plain_len(value: &str) -> usize {
    strip_comment(value).trim_end().len()
}

/// Length of a quoted scalar including both quotes.
fn quoted_len(value: &str, quote: u8) -> Option<usize> {
    let bytes = value.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 2,
            b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// Drop a trailing ` # comment`.
fn strip_comment(text: &str) -> &str {
    if text.starts_with('#') {
        return "";
    }
    match text.find(" #").or_else(|| text.find("\t#")) {
        Some(i) => &text[..i],
        None => text,
    }
}

fn keys_error(line_no: usize, reason: &str) -> crate::error::Error {
    ManifestError::KeysParse(format!("line {}: {}", line_no, reason)).into()
}
