//! Message: tree root, parser, serializer and the query/mutation surface
//!
//! A message owns its segments exclusively; removing a segment or
//! overwriting a field discards the previous subtree. The tree is mutable
//! and not synchronized — callers sharing one message across threads must
//! impose their own mutual exclusion.

use log::{debug, warn};

use crate::core::{datetime, scanner, Encoding};
use crate::error::{Hl7Error, Hl7Result};
use crate::path::Path;

use super::component::{Component, ComponentData};
use super::field::{Field, FieldData, RepetitionData};
use super::segment::Segment;
use super::value::Value;

/// Root of the node hierarchy: ordered segments plus the encoding the
/// message was parsed or built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) encoding: Encoding,
    pub(crate) segments: Vec<Segment>,
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl Message {
    /// Empty message with the standard `|^~\&` encoding.
    pub fn new() -> Self {
        Message {
            encoding: Encoding::new(),
            segments: Vec::new(),
        }
    }

    /// Empty message with a caller-supplied encoding.
    pub fn with_encoding(encoding: Encoding) -> Self {
        Message {
            encoding,
            segments: Vec::new(),
        }
    }

    #[inline]
    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    /// Parse a raw text block into a message tree.
    ///
    /// The encoding is derived from the MSH line itself: the character
    /// after "MSH" is the field separator, the next field supplies the
    /// remaining four delimiters. Leaf escape decoding is deferred to the
    /// query API, so a failed decode never fails the parse.
    pub fn parse(text: &str) -> Hl7Result<Message> {
        let (lines, first_break) = scanner::split_lines(text);
        let Some(first) = lines.first() else {
            return Err(Hl7Error::Structural(
                "message contains no segments".to_string(),
            ));
        };
        if !first.starts_with("MSH") {
            warn!("rejecting message that does not begin with MSH");
            return Err(Hl7Error::Structural(
                "message must begin with an MSH segment".to_string(),
            ));
        }
        let bytes = first.as_bytes();
        if bytes.len() < 4 {
            return Err(Hl7Error::Structural("MSH segment is truncated".to_string()));
        }
        let field_separator = bytes[3];
        let delimiter_end = memchr::memchr(field_separator, &bytes[4..])
            .map(|j| 4 + j)
            .unwrap_or(first.len());
        let encoding = Encoding::from_delimiters(field_separator, &first[4..delimiter_end])?
            .with_segment_delimiter(first_break.unwrap_or("\r"));

        let mut segments = Vec::with_capacity(lines.len());
        for line in &lines {
            segments.push(Segment::parse(line, &encoding)?);
        }
        debug!("parsed message with {} segments", segments.len());
        Ok(Message { encoding, segments })
    }

    /// Render the tree back to text. Never fails on a well-formed tree;
    /// absent trailing positions emit nothing, empty positions emit their
    /// delimiter slot, explicit nulls emit the literal `""`.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            segment.serialize_into(&mut out, &self.encoding);
            out.push_str(self.encoding.segment_delimiter());
        }
        out
    }

    /// Like [`serialize`](Self::serialize), but validates the header
    /// before returning the text.
    pub fn serialize_strict(&self) -> Hl7Result<String> {
        if self.segments.is_empty() {
            return Err(Hl7Error::Structural(
                "message contains no segments".to_string(),
            ));
        }
        if self.segments[0].name() != "MSH" {
            return Err(Hl7Error::Structural(
                "first segment must be MSH".to_string(),
            ));
        }
        if self.encoding.delimiter_field().chars().count() != 4 {
            return Err(Hl7Error::Structural(
                "unsupported encoding character length".to_string(),
            ));
        }
        Ok(self.serialize())
    }

    /// All segments with the given name, in document order.
    pub fn segments(&self, name: &str) -> Vec<&Segment> {
        self.segments
            .iter()
            .filter(|segment| segment.name() == name)
            .collect()
    }

    /// First segment with the given name.
    pub fn default_segment(&self, name: &str) -> Hl7Result<&Segment> {
        self.segments
            .iter()
            .find(|segment| segment.name() == name)
            .ok_or_else(|| Hl7Error::Lookup(format!("segment {:?} does not exist", name)))
    }

    /// Total number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Append a segment to the message.
    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Remove one occurrence of a segment name (0-based among same-name
    /// matches). Returns whether anything was removed.
    pub fn remove_segment(&mut self, name: &str, index: usize) -> bool {
        let mut seen = 0;
        let position = self.segments.iter().position(|segment| {
            if segment.name() != name {
                return false;
            }
            if seen == index {
                true
            } else {
                seen += 1;
                false
            }
        });
        match position {
            Some(i) => {
                self.segments.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove every occurrence of a segment name; returns how many went.
    pub fn remove_segments(&mut self, name: &str) -> usize {
        let before = self.segments.len();
        self.segments.retain(|segment| segment.name() != name);
        before - self.segments.len()
    }

    /// Resolve a dot path to a decoded value.
    ///
    /// `Some("")` for an empty leaf, `None` for an explicit null or an
    /// absent repetition/component/subcomponent; a lookup error when the
    /// segment or the field itself does not exist at all.
    pub fn get_value(&self, path: &str) -> Hl7Result<Option<String>> {
        let path = Path::parse(path)?;
        let segment = self.default_segment(path.segment())?;
        let Some(field_position) = path.field() else {
            return Ok(Some(segment.serialize(&self.encoding)));
        };
        if segment.name() == "MSH" && field_position <= 2 {
            // Literal delimiter fields, never decoded or re-split
            return Ok(Some(if field_position == 1 {
                self.encoding.field_separator().to_string()
            } else {
                self.encoding.delimiter_field()
            }));
        }
        let field = segment.field(field_position).ok_or_else(|| {
            Hl7Error::Lookup(format!(
                "field {} does not exist in {}",
                field_position,
                segment.name()
            ))
        })?;
        match path.component() {
            None => self.read_field(field),
            Some(component) => {
                self.read_leaf(field, path.repetition(), component, path.subcomponent())
            }
        }
    }

    /// Build and append a complete MSH segment; field 7 is stamped with
    /// the current local time at fractional-second precision.
    #[allow(clippy::too_many_arguments)]
    pub fn add_msh_segment(
        &mut self,
        sending_application: &str,
        sending_facility: &str,
        receiving_application: &str,
        receiving_facility: &str,
        security: &str,
        message_type: &str,
        control_id: &str,
        processing_id: &str,
        version: &str,
    ) {
        let encoding = self.encoding.clone();
        let mut msh = Segment::new("MSH");
        msh.add_field(Field::literal(encoding.field_separator().to_string()));
        msh.add_field(Field::literal(encoding.delimiter_field()));
        for value in [
            sending_application,
            sending_facility,
            receiving_application,
            receiving_facility,
        ] {
            msh.add_field(Field::parse(value, &encoding));
        }
        let timestamp = datetime::long_date_with_fraction(&chrono::Local::now().naive_local());
        msh.add_field(Field::parse(&timestamp, &encoding));
        for value in [security, message_type, control_id, processing_id, version] {
            msh.add_field(Field::parse(value, &encoding));
        }
        self.segments.push(msh);
    }

    /// Whole-field read: the serialized field text, decoded.
    fn read_field(&self, field: &Field) -> Hl7Result<Option<String>> {
        if let Some(value) = field.value() {
            return value.decoded(&self.encoding);
        }
        let raw = field.raw_value(&self.encoding);
        Ok(Some(self.encoding.decode(&raw)?.into_owned()))
    }

    /// Leaf read below field granularity. A scalar node stands in for its
    /// own single implicit piece at position 1 on every deeper level.
    fn read_leaf(
        &self,
        field: &Field,
        repetition: usize,
        component: usize,
        subcomponent: Option<usize>,
    ) -> Hl7Result<Option<String>> {
        let components: &[Component] = match &field.data {
            FieldData::Value(value) => {
                let addressable =
                    repetition == 1 && component == 1 && subcomponent.unwrap_or(1) == 1;
                return self.read_scalar(value, addressable);
            }
            FieldData::Components(components) => {
                if repetition != 1 {
                    return Ok(None);
                }
                components
            }
            FieldData::Repetitions(repetitions) => match repetitions.get(repetition - 1) {
                None => return Ok(None),
                Some(rep) => match &rep.data {
                    RepetitionData::Value(value) => {
                        let addressable = component == 1 && subcomponent.unwrap_or(1) == 1;
                        return self.read_scalar(value, addressable);
                    }
                    RepetitionData::Components(components) => components,
                },
            },
        };
        let Some(node) = components.get(component - 1) else {
            return Ok(None);
        };
        match (&node.data, subcomponent) {
            (ComponentData::Value(value), None | Some(1)) => value.decoded(&self.encoding),
            (ComponentData::Value(_), Some(_)) => Ok(None),
            (ComponentData::SubComponents(_), None) => {
                let raw = node.raw_value(&self.encoding);
                Ok(Some(self.encoding.decode(&raw)?.into_owned()))
            }
            (ComponentData::SubComponents(subs), Some(position)) => match subs.get(position - 1) {
                None => Ok(None),
                Some(sub) => sub.value().decoded(&self.encoding),
            },
        }
    }

    fn read_scalar(&self, value: &Value, addressable: bool) -> Hl7Result<Option<String>> {
        if addressable {
            value.decoded(&self.encoding)
        } else {
            Ok(None)
        }
    }
}
