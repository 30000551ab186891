//! Component and SubComponent nodes

use crate::core::{scanner, Encoding};

use super::value::Value;

/// Leaf scalar node at the bottom of the value hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubComponent {
    pub(crate) value: Value,
}

impl SubComponent {
    pub fn new(raw: &str) -> Self {
        SubComponent {
            value: Value::from_raw(raw),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ComponentData {
    Value(Value),
    SubComponents(Vec<SubComponent>),
}

/// One component of a repetition: a scalar, or subcomponents when the
/// subcomponent separator is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub(crate) data: ComponentData,
}

impl Component {
    /// Build from raw text, splitting on the subcomponent separator.
    /// The subcomponent layer is only materialized for multiplicity > 1.
    pub fn parse(raw: &str, encoding: &Encoding) -> Self {
        let pieces = scanner::split_escaped(raw, encoding.subcomponent, encoding.escape);
        if pieces.len() <= 1 {
            Component {
                data: ComponentData::Value(Value::from_raw(raw)),
            }
        } else {
            Component {
                data: ComponentData::SubComponents(
                    pieces.into_iter().map(SubComponent::new).collect(),
                ),
            }
        }
    }

    pub fn empty() -> Self {
        Component {
            data: ComponentData::Value(Value::Empty),
        }
    }

    /// Subcomponents, when materialized.
    pub fn sub_components(&self) -> Option<&[SubComponent]> {
        match &self.data {
            ComponentData::Value(_) => None,
            ComponentData::SubComponents(subs) => Some(subs),
        }
    }

    /// Scalar value, when no subcomponent layer is present.
    pub fn value(&self) -> Option<&Value> {
        match &self.data {
            ComponentData::Value(value) => Some(value),
            ComponentData::SubComponents(_) => None,
        }
    }

    pub(crate) fn serialize_into(&self, out: &mut String, encoding: &Encoding) {
        match &self.data {
            ComponentData::Value(value) => out.push_str(value.as_raw()),
            ComponentData::SubComponents(subs) => {
                for (i, sub) in subs.iter().enumerate() {
                    if i > 0 {
                        out.push(encoding.subcomponent as char);
                    }
                    out.push_str(sub.value.as_raw());
                }
            }
        }
    }

    /// Raw serialized text of this component.
    pub fn raw_value(&self, encoding: &Encoding) -> String {
        let mut out = String::new();
        self.serialize_into(&mut out, encoding);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_component() {
        let enc = Encoding::new();
        let component = Component::parse("ADT", &enc);
        assert!(component.sub_components().is_none());
        assert_eq!(component.raw_value(&enc), "ADT");
    }

    #[test]
    fn test_subcomponent_split() {
        let enc = Encoding::new();
        let component = Component::parse("A&B&", &enc);
        let subs = component.sub_components().unwrap();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0].value(), &Value::Text("A".to_string()));
        assert!(subs[2].value().is_empty());
        assert_eq!(component.raw_value(&enc), "A&B&");
    }

    #[test]
    fn test_escaped_separator_stays_scalar() {
        let enc = Encoding::new();
        let component = Component::parse("A\\T\\B", &enc);
        assert!(component.sub_components().is_none());
    }
}
