//! Field and Repetition nodes
//!
//! A field is a scalar, a component list, or a repetition list. Layers
//! are only materialized where the corresponding separator actually
//! yields multiplicity, so `serialize(parse(x)) == x` holds byte-for-byte.

use crate::core::{scanner, Encoding};

use super::component::{Component, ComponentData};
use super::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RepetitionData {
    Value(Value),
    Components(Vec<Component>),
}

/// One repetition of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repetition {
    pub(crate) data: RepetitionData,
}

impl Repetition {
    /// Build from raw text, splitting on the component separator.
    pub fn parse(raw: &str, encoding: &Encoding) -> Self {
        let pieces = scanner::split_escaped(raw, encoding.component, encoding.escape);
        if pieces.len() <= 1 {
            Repetition {
                data: RepetitionData::Value(Value::from_raw(raw)),
            }
        } else {
            Repetition {
                data: RepetitionData::Components(
                    pieces
                        .into_iter()
                        .map(|piece| Component::parse(piece, encoding))
                        .collect(),
                ),
            }
        }
    }

    pub fn components(&self) -> Option<&[Component]> {
        match &self.data {
            RepetitionData::Value(_) => None,
            RepetitionData::Components(components) => Some(components),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.data {
            RepetitionData::Value(value) => Some(value),
            RepetitionData::Components(_) => None,
        }
    }

    fn components_mut(&mut self) -> &mut Vec<Component> {
        if let RepetitionData::Value(value) = &self.data {
            let components = promote_scalar(value);
            self.data = RepetitionData::Components(components);
        }
        match &mut self.data {
            RepetitionData::Components(components) => components,
            RepetitionData::Value(_) => unreachable!(),
        }
    }

    pub(crate) fn serialize_into(&self, out: &mut String, encoding: &Encoding) {
        match &self.data {
            RepetitionData::Value(value) => out.push_str(value.as_raw()),
            RepetitionData::Components(components) => {
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        out.push(encoding.component as char);
                    }
                    component.serialize_into(out, encoding);
                }
            }
        }
    }
}

/// A non-empty scalar becomes component 1; an empty scalar promotes to no
/// components at all, so back-fill produces the leading empty slots.
fn promote_scalar(value: &Value) -> Vec<Component> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![Component {
            data: ComponentData::Value(value.clone()),
        }]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FieldData {
    Value(Value),
    Components(Vec<Component>),
    Repetitions(Vec<Repetition>),
}

/// One field of a segment, 1-indexed within it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub(crate) data: FieldData,
}

impl Field {
    /// Build from raw text, splitting on the repetition separator and then
    /// recursively on the component/subcomponent separators.
    pub fn parse(raw: &str, encoding: &Encoding) -> Self {
        let repetitions = scanner::split_escaped(raw, encoding.repetition, encoding.escape);
        if repetitions.len() > 1 {
            return Field {
                data: FieldData::Repetitions(
                    repetitions
                        .into_iter()
                        .map(|piece| Repetition::parse(piece, encoding))
                        .collect(),
                ),
            };
        }
        let components = scanner::split_escaped(raw, encoding.component, encoding.escape);
        if components.len() > 1 {
            return Field {
                data: FieldData::Components(
                    components
                        .into_iter()
                        .map(|piece| Component::parse(piece, encoding))
                        .collect(),
                ),
            };
        }
        Field {
            data: FieldData::Value(Value::from_raw(raw)),
        }
    }

    /// Present-but-empty field (the back-fill filler).
    pub fn empty() -> Self {
        Field {
            data: FieldData::Value(Value::Empty),
        }
    }

    /// Literal field that is never split or decoded — the MSH delimiter
    /// fields.
    pub(crate) fn literal(text: String) -> Self {
        Field {
            data: FieldData::Value(Value::Text(text)),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.data {
            FieldData::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn components(&self) -> Option<&[Component]> {
        match &self.data {
            FieldData::Components(components) => Some(components),
            _ => None,
        }
    }

    pub fn repetitions(&self) -> Option<&[Repetition]> {
        match &self.data {
            FieldData::Repetitions(repetitions) => Some(repetitions),
            _ => None,
        }
    }

    /// Append a component after the current maximum position.
    pub fn add_component(&mut self, component: Component) {
        self.components_vec_mut().push(component);
    }

    /// Place a component at a 1-based position: overwrites an occupied
    /// position, back-fills intervening positions with empty components.
    pub fn set_component(&mut self, position: usize, component: Component) {
        assert!(position > 0, "component positions are 1-based");
        let components = self.components_vec_mut();
        if position <= components.len() {
            components[position - 1] = component;
        } else {
            while components.len() < position - 1 {
                components.push(Component::empty());
            }
            components.push(component);
        }
    }

    /// Component list to mutate: promotes a scalar in place, and targets
    /// the first repetition when the field repeats.
    fn components_vec_mut(&mut self) -> &mut Vec<Component> {
        if let FieldData::Value(value) = &self.data {
            let components = promote_scalar(value);
            self.data = FieldData::Components(components);
        }
        match &mut self.data {
            FieldData::Components(components) => components,
            FieldData::Repetitions(repetitions) => {
                if repetitions.is_empty() {
                    repetitions.push(Repetition {
                        data: RepetitionData::Components(Vec::new()),
                    });
                }
                repetitions[0].components_mut()
            }
            FieldData::Value(_) => unreachable!(),
        }
    }

    pub(crate) fn serialize_into(&self, out: &mut String, encoding: &Encoding) {
        match &self.data {
            FieldData::Value(value) => out.push_str(value.as_raw()),
            FieldData::Components(components) => {
                for (i, component) in components.iter().enumerate() {
                    if i > 0 {
                        out.push(encoding.component as char);
                    }
                    component.serialize_into(out, encoding);
                }
            }
            FieldData::Repetitions(repetitions) => {
                for (i, repetition) in repetitions.iter().enumerate() {
                    if i > 0 {
                        out.push(encoding.repetition as char);
                    }
                    repetition.serialize_into(out, encoding);
                }
            }
        }
    }

    /// Raw serialized text of the whole field.
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
    fn test_scalar_field() {
        let enc = Encoding::new();
        let field = Field::parse("ADT", &enc);
        assert_eq!(field.value(), Some(&Value::Text("ADT".to_string())));
        assert_eq!(field.raw_value(&enc), "ADT");
    }

    #[test]
    fn test_componentized_field() {
        let enc = Encoding::new();
        let field = Field::parse("ADT^A04", &enc);
        let components = field.components().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(field.raw_value(&enc), "ADT^A04");
    }

    #[test]
    fn test_repeating_field() {
        let enc = Encoding::new();
        let field = Field::parse("A~B^C", &enc);
        let repetitions = field.repetitions().unwrap();
        assert_eq!(repetitions.len(), 2);
        assert!(repetitions[0].value().is_some());
        assert_eq!(repetitions[1].components().unwrap().len(), 2);
        assert_eq!(field.raw_value(&enc), "A~B^C");
    }

    #[test]
    fn test_trailing_empty_component_survives() {
        let enc = Encoding::new();
        let field = Field::parse("A^", &enc);
        assert_eq!(field.components().unwrap().len(), 2);
        assert_eq!(field.raw_value(&enc), "A^");
    }

    #[test]
    fn test_set_component_promotes_scalar() {
        let enc = Encoding::new();
        let mut field = Field::parse("ZIB5", &enc);
        field.set_component(3, Component::parse("ZIB.5.3_", &enc));
        // Overwrite the same position again
        field.set_component(3, Component::parse("ZIB.5.3", &enc));
        assert_eq!(field.raw_value(&enc), "ZIB5^^ZIB.5.3");
    }

    #[test]
    fn test_set_component_backfills_empty_field() {
        let enc = Encoding::new();
        let mut field = Field::empty();
        field.set_component(3, Component::parse("X", &enc));
        assert_eq!(field.raw_value(&enc), "^^X");
    }

    #[test]
    fn test_null_marker_round_trips() {
        let enc = Encoding::new();
        let field = Field::parse("\"\"", &enc);
        assert!(field.value().unwrap().is_null());
        assert_eq!(field.raw_value(&enc), "\"\"");
    }
}
