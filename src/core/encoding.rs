//! HL7 encoding configuration and escape-sequence codec
//!
//! Holds the delimiter set a message was parsed or built with and converts
//! arbitrary content to and from the `\F\ \S\ \T\ \R\ \E\` escape tokens,
//! so content containing delimiter characters can be embedded in any field
//! without being mis-split.
//!
//! Uses Cow for zero-copy when no escaping is needed.

use std::borrow::Cow;

use memchr::memchr;

use crate::error::{Hl7Error, Hl7Result};

/// Delimiter set for one message.
///
/// Immutable once constructed; passed by reference into every parse,
/// serialize and codec call — never ambient state, since one process may
/// handle messages with different delimiter sets at the same time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    pub(crate) field: u8,
    pub(crate) component: u8,
    pub(crate) repetition: u8,
    pub(crate) escape: u8,
    pub(crate) subcomponent: u8,
    segment_delimiter: String,
}

impl Default for Encoding {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoding {
    /// The standard `|^~\&` delimiter set with CR segment breaks.
    pub fn new() -> Self {
        Encoding {
            field: b'|',
            component: b'^',
            repetition: b'~',
            escape: b'\\',
            subcomponent: b'&',
            segment_delimiter: "\r".to_string(),
        }
    }

    /// Build from an MSH prefix: the field separator plus the 4-character
    /// delimiter field (component, repetition, escape, subcomponent in
    /// that fixed order).
    pub fn from_delimiters(field: u8, delimiters: &str) -> Hl7Result<Self> {
        let d = delimiters.as_bytes();
        if d.len() != 4 {
            return Err(Hl7Error::Structural(format!(
                "delimiter field must be exactly 4 characters, got {:?}",
                delimiters
            )));
        }
        Ok(Encoding {
            field,
            component: d[0],
            repetition: d[1],
            escape: d[2],
            subcomponent: d[3],
            segment_delimiter: "\r".to_string(),
        })
    }

    /// Replace the segment delimiter (used by the parser to carry the line
    /// ending it observed through to serialization).
    pub(crate) fn with_segment_delimiter(mut self, delimiter: &str) -> Self {
        self.segment_delimiter = delimiter.to_string();
        self
    }

    #[inline]
    pub fn field_separator(&self) -> char {
        self.field as char
    }

    #[inline]
    pub fn component_separator(&self) -> char {
        self.component as char
    }

    #[inline]
    pub fn repetition_separator(&self) -> char {
        self.repetition as char
    }

    #[inline]
    pub fn escape_character(&self) -> char {
        self.escape as char
    }

    #[inline]
    pub fn subcomponent_separator(&self) -> char {
        self.subcomponent as char
    }

    #[inline]
    pub fn segment_delimiter(&self) -> &str {
        &self.segment_delimiter
    }

    /// Reconstruct the MSH-2 delimiter field (`^~\&` for the defaults).
    pub fn delimiter_field(&self) -> String {
        [self.component, self.repetition, self.escape, self.subcomponent]
            .iter()
            .map(|&b| b as char)
            .collect()
    }

    #[inline]
    fn token_for(&self, b: u8) -> Option<char> {
        // Escape char checked first so encode never double-escapes
        if b == self.escape {
            Some('E')
        } else if b == self.field {
            Some('F')
        } else if b == self.component {
            Some('S')
        } else if b == self.repetition {
            Some('R')
        } else if b == self.subcomponent {
            Some('T')
        } else {
            None
        }
    }

    /// Escape delimiter characters inside arbitrary content.
    ///
    /// Returns Borrowed if nothing needs escaping (zero-copy).
    pub fn encode<'a>(&self, text: &'a str) -> Cow<'a, str> {
        // Fast path: no delimiter or escape character present
        if !text.bytes().any(|b| self.token_for(b).is_some()) {
            return Cow::Borrowed(text);
        }
        let mut out = String::with_capacity(text.len() + 8);
        for ch in text.chars() {
            match u8::try_from(ch as u32).ok().and_then(|b| self.token_for(b)) {
                Some(token) => {
                    out.push(self.escape as char);
                    out.push(token);
                    out.push(self.escape as char);
                }
                None => out.push(ch),
            }
        }
        Cow::Owned(out)
    }

    /// Exact inverse of [`encode`](Self::encode).
    ///
    /// Returns Borrowed if no escape character is present (zero-copy).
    /// Fails with a format error on an escape token it does not recognize
    /// or an unterminated escape sequence.
    pub fn decode<'a>(&self, text: &'a str) -> Hl7Result<Cow<'a, str>> {
        let bytes = text.as_bytes();
        // Fast path: no escape introducer present
        if memchr(self.escape, bytes).is_none() {
            return Ok(Cow::Borrowed(text));
        }
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        while pos < bytes.len() {
            match memchr(self.escape, &bytes[pos..]) {
                None => {
                    out.push_str(&text[pos..]);
                    break;
                }
                Some(offset) => {
                    let open = pos + offset;
                    out.push_str(&text[pos..open]);
                    let close = match memchr(self.escape, &bytes[open + 1..]) {
                        Some(j) => open + 1 + j,
                        None => {
                            return Err(Hl7Error::Format(format!(
                                "unterminated escape sequence in {:?}",
                                text
                            )))
                        }
                    };
                    match &text[open + 1..close] {
                        "F" => out.push(self.field as char),
                        "S" => out.push(self.component as char),
                        "T" => out.push(self.subcomponent as char),
                        "R" => out.push(self.repetition as char),
                        "E" => out.push(self.escape as char),
                        token => {
                            return Err(Hl7Error::Format(format!(
                                "unrecognized escape sequence {:?}",
                                token
                            )))
                        }
                    }
                    pos = close + 1;
                }
            }
        }
        Ok(Cow::Owned(out))
    }
}
