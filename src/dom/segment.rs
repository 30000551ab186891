//! Segment node: one named record line

use crate::core::{scanner, Encoding};
use crate::error::{Hl7Error, Hl7Result};

use super::field::Field;

/// A named, ordered collection of fields. Field positions are 1-indexed;
/// position 0 is the segment name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    name: String,
    fields: Vec<Field>,
}

impl Segment {
    pub fn new(name: &str) -> Self {
        Segment {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Parse one segment line. MSH gets its own branch: fields 1 and 2 are
    /// the delimiter characters themselves, assigned literally and never
    /// re-split by the delimiters they define.
    pub(crate) fn parse(line: &str, encoding: &Encoding) -> Hl7Result<Segment> {
        if line.starts_with("MSH") {
            return Self::parse_msh(line, encoding);
        }
        let pieces = scanner::split_escaped(line, encoding.field, encoding.escape);
        let name = pieces[0];
        if name.len() != 3 {
            return Err(Hl7Error::Structural(format!(
                "invalid segment name {:?}",
                name
            )));
        }
        Ok(Segment {
            name: name.to_string(),
            fields: pieces[1..]
                .iter()
                .map(|raw| Field::parse(raw, encoding))
                .collect(),
        })
    }

    fn parse_msh(line: &str, encoding: &Encoding) -> Hl7Result<Segment> {
        let bytes = line.as_bytes();
        if bytes.len() < 4 || bytes[3] != encoding.field {
            return Err(Hl7Error::Structural(
                "MSH segment is missing its field separator".to_string(),
            ));
        }
        let delimiter_end = memchr::memchr(encoding.field, &bytes[4..])
            .map(|j| 4 + j)
            .unwrap_or(line.len());
        let mut fields = vec![
            Field::literal(encoding.field_separator().to_string()),
            Field::literal(line[4..delimiter_end].to_string()),
        ];
        if delimiter_end < line.len() {
            let rest = &line[delimiter_end + 1..];
            fields.extend(
                scanner::split_escaped(rest, encoding.field, encoding.escape)
                    .into_iter()
                    .map(|raw| Field::parse(raw, encoding)),
            );
        }
        Ok(Segment {
            name: "MSH".to_string(),
            fields,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All fields in position order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field at a 1-based position, `None` when absent.
    pub fn field(&self, position: usize) -> Option<&Field> {
        position.checked_sub(1).and_then(|i| self.fields.get(i))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Append a field after the current maximum position.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Place a field at a 1-based position: overwrites an occupied
    /// position (no shift), back-fills intervening positions with empty
    /// fields so indices stay contiguous.
    pub fn set_field(&mut self, position: usize, field: Field) {
        assert!(position > 0, "field positions are 1-based");
        if position <= self.fields.len() {
            self.fields[position - 1] = field;
        } else {
            while self.fields.len() < position - 1 {
                self.fields.push(Field::empty());
            }
            self.fields.push(field);
        }
    }

    pub(crate) fn serialize_into(&self, out: &mut String, encoding: &Encoding) {
        let separator = encoding.field as char;
        out.push_str(&self.name);
        if self.name == "MSH" {
            // Fields 1 and 2 are reconstructed from the encoding, never
            // from re-joining sub-nodes
            out.push(separator);
            out.push_str(&encoding.delimiter_field());
            for field in self.fields.iter().skip(2) {
                out.push(separator);
                field.serialize_into(out, encoding);
            }
        } else {
            for field in &self.fields {
                out.push(separator);
                field.serialize_into(out, encoding);
            }
        }
    }

    /// Serialized segment line, without the segment terminator.
    pub fn serialize(&self, encoding: &Encoding) -> String {
        let mut out = String::new();
        self.serialize_into(&mut out, encoding);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::value::Value;

    #[test]
    fn test_parse_keeps_trailing_empty_fields() {
        let enc = Encoding::new();
        let segment = Segment::parse("EVN|A04|20110613083617||", &enc).unwrap();
        assert_eq!(segment.field_count(), 4);
        assert!(segment.field(4).unwrap().value().unwrap().is_empty());
        assert_eq!(segment.serialize(&enc), "EVN|A04|20110613083617||");
    }

    #[test]
    fn test_parse_rejects_bad_name() {
        let enc = Encoding::new();
        assert!(Segment::parse("EV|A04", &enc).is_err());
        assert!(Segment::parse("EVNT|A04", &enc).is_err());
    }

    #[test]
    fn test_msh_literal_fields() {
        let enc = Encoding::new();
        let segment = Segment::parse("MSH|^~\\&|SA|SF", &enc).unwrap();
        assert_eq!(
            segment.field(1).unwrap().value(),
            Some(&Value::Text("|".to_string()))
        );
        assert_eq!(
            segment.field(2).unwrap().value(),
            Some(&Value::Text("^~\\&".to_string()))
        );
        assert_eq!(segment.field(3).unwrap().raw_value(&enc), "SA");
        assert_eq!(segment.serialize(&enc), "MSH|^~\\&|SA|SF");
    }

    #[test]
    fn test_set_field_overwrites() {
        let enc = Encoding::new();
        let mut pid = Segment::new("PID");
        pid.set_field(1, Field::parse("1", &enc));
        pid.set_field(1, Field::parse("2", &enc));
        assert_eq!(pid.serialize(&enc), "PID|2");
    }

    #[test]
    fn test_set_field_backfills() {
        let enc = Encoding::new();
        let mut zib = Segment::new("ZIB");
        zib.add_field(Field::parse("ZIB1", &enc));
        zib.set_field(5, Field::parse("ZIB5", &enc));
        assert_eq!(zib.serialize(&enc), "ZIB|ZIB1||||ZIB5");
    }
}
