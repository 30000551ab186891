//! Tri-state leaf values
//!
//! A leaf position is exactly one of: absent (not stored in its parent at
//! all), empty (delimiters present, zero-length content), explicit-null
//! (the literal `""` marker) or text. Text keeps the raw wire form;
//! escape decoding happens only when a leaf is read through the query API.

use crate::core::Encoding;
use crate::error::Hl7Result;

/// The explicit-null wire marker: present and intentionally blank.
pub const NULL_MARKER: &str = "\"\"";

/// Scalar content of a leaf position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Present but zero-length
    Empty,
    /// The `""` marker — must round-trip byte-for-byte, never collapse
    /// to empty
    Null,
    /// Raw (still escaped) content
    Text(String),
}

impl Value {
    /// Classify a raw wire token.
    pub fn from_raw(raw: &str) -> Value {
        match raw {
            "" => Value::Empty,
            NULL_MARKER => Value::Null,
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Wire form, byte-identical to what was parsed.
    pub fn as_raw(&self) -> &str {
        match self {
            Value::Empty => "",
            Value::Null => NULL_MARKER,
            Value::Text(raw) => raw,
        }
    }

    /// Decoded read: empty string for an empty value, `None` for the
    /// explicit null, decoded text otherwise.
    pub fn decoded(&self, encoding: &Encoding) -> Hl7Result<Option<String>> {
        match self {
            Value::Empty => Ok(Some(String::new())),
            Value::Null => Ok(None),
            Value::Text(raw) => Ok(Some(encoding.decode(raw)?.into_owned())),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_classification() {
        assert_eq!(Value::from_raw(""), Value::Empty);
        assert_eq!(Value::from_raw("\"\""), Value::Null);
        assert_eq!(Value::from_raw("A"), Value::Text("A".to_string()));
    }

    #[test]
    fn test_raw_round_trip() {
        for raw in ["", "\"\"", "some text"] {
            assert_eq!(Value::from_raw(raw).as_raw(), raw);
        }
    }

    #[test]
    fn test_decoded_tri_state() {
        let enc = Encoding::new();
        assert_eq!(Value::Empty.decoded(&enc).unwrap(), Some(String::new()));
        assert_eq!(Value::Null.decoded(&enc).unwrap(), None);
        assert_eq!(
            Value::from_raw("a\\T\\b").decoded(&enc).unwrap(),
            Some("a&b".to_string())
        );
    }
}
