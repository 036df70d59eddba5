//! Encoding detection, separator sniffing and header parsing for delimited files.

use crate::config::{Encoding, Separator};
use crate::prelude::*;
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Text decoded from a file together with the encoding that was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: Encoding,
    /// Whether a UTF-8 byte order mark was stripped
    pub had_bom: bool,
}

/// Decodes raw file bytes.
///
/// `Auto` uses UTF-8 when the bytes are valid UTF-8 and Latin-1 otherwise.
/// Latin-1 is read with the WHATWG `windows-1252` table, which agrees with
/// ISO-8859-1 outside `0x80..=0x9F` and never fails.
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<DecodedText> {
    let had_bom = encoding != Encoding::Latin1 && bytes.starts_with(UTF8_BOM);
    let body = if had_bom {
        &bytes[UTF8_BOM.len()..]
    } else {
        bytes
    };
    let utf8 = || {
        UTF_8
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| DecodedText {
                text: text.into_owned(),
                encoding: Encoding::Utf8,
                had_bom,
            })
    };

    match encoding {
        Encoding::Latin1 => Ok(latin1(body, had_bom)),
        Encoding::Utf8 => utf8().ok_or_else(|| {
            EdaError::data_source("csv", "file is not valid UTF-8; set encoding to latin-1")
        }),
        Encoding::Auto => Ok(utf8().unwrap_or_else(|| latin1(body, had_bom))),
    }
}

fn latin1(bytes: &[u8], had_bom: bool) -> DecodedText {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    DecodedText {
        text: text.into_owned(),
        encoding: Encoding::Latin1,
        had_bom,
    }
}

/// Returns the first line of `text` without its line terminator.
pub fn first_line(text: &str) -> &str {
    let line = text.split('\n').next().unwrap_or_default();
    line.strip_suffix('\r').unwrap_or(line)
}

/// Picks the separator among [`Separator::CANDIDATES`] that occurs most often
/// outside quotes in `header`. Ties go to the earlier candidate; a header with
/// none of them is read as a single comma-separated column.
pub fn sniff_separator(header: &str, quote: u8) -> u8 {
    let mut counts = [0usize; Separator::CANDIDATES.len()];
    let mut quoted = false;
    for byte in header.bytes() {
        if byte == quote {
            quoted = !quoted;
        } else if !quoted {
            if let Some(idx) = Separator::CANDIDATES.iter().position(|&c| c == byte) {
                counts[idx] += 1;
            }
        }
    }

    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    Separator::CANDIDATES[best]
}

/// Splits a header line into cell texts, honoring quotes and doubled quotes.
pub fn split_line(line: &str, separator: u8, quote: u8) -> Vec<String> {
    let separator = char::from(separator);
    let quote = char::from(quote);
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == quote {
            if quoted && chars.peek() == Some(&quote) {
                current.push(quote);
                chars.next();
            } else {
                quoted = !quoted;
            }
        } else if c == separator && !quoted {
            cells.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    cells.push(current);
    cells
}

/// Makes header names usable as column names: blanks become `column_<n>`
/// (one-based) and repeats get a `.1`, `.2`, ... suffix.
pub fn unique_column_names(header: Vec<String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(header.len());
    for (idx, name) in header.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("column_{}", idx + 1)
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while names.iter().any(|known| known == &candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(candidate);
    }
    names
}

/// Appends separators to records that have fewer cells than `columns`, so
/// the missing trailing cells read as nulls.
///
/// Records are split on newlines outside quotes; blank lines and records with
/// extra cells are left as they are. Returns the text (borrowed when nothing
/// changed) and the number of records that were padded.
pub fn pad_short_records(
    text: &str,
    separator: u8,
    quote: u8,
    columns: usize,
) -> (Cow<'_, str>, usize) {
    let expected = columns.saturating_sub(1);
    let mut padder = Padder {
        text,
        fill: char::from(separator),
        expected,
        out: None,
        copied: 0,
        rows: 0,
    };
    let mut start = 0usize;
    let mut separators = 0usize;
    let mut quoted = false;

    for (pos, byte) in text.bytes().enumerate() {
        if byte == quote {
            quoted = !quoted;
        } else if quoted {
            continue;
        } else if byte == separator {
            separators += 1;
        } else if byte == b'\n' {
            padder.close(start, pos, separators);
            start = pos + 1;
            separators = 0;
        }
    }
    if start < text.len() {
        padder.close(start, text.len(), separators);
    }
    padder.finish()
}

struct Padder<'a> {
    text: &'a str,
    fill: char,
    expected: usize,
    out: Option<String>,
    copied: usize,
    rows: usize,
}

impl<'a> Padder<'a> {
    fn close(&mut self, start: usize, end: usize, separators: usize) {
        let end = match self.text.as_bytes()[start..end].last() {
            Some(b'\r') => end - 1,
            _ => end,
        };
        if end == start || separators >= self.expected {
            return;
        }
        let capacity = self.text.len() + 64;
        let out = self
            .out
            .get_or_insert_with(|| String::with_capacity(capacity));
        out.push_str(&self.text[self.copied..end]);
        out.extend(std::iter::repeat(self.fill).take(self.expected - separators));
        self.copied = end;
        self.rows += 1;
    }

    fn finish(self) -> (Cow<'a, str>, usize) {
        match self.out {
            Some(mut out) => {
                out.push_str(&self.text[self.copied..]);
                (Cow::Owned(out), self.rows)
            }
            None => (Cow::Borrowed(self.text), 0),
        }
    }
}
