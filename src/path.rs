//! Dot-path addressing
//!
//! Paths take the forms `SEG`, `SEG.F`, `SEG.F.C`, `SEG.F.R.C` and
//! `SEG.F.R.C.S`. Two indices read as field.component by convention when
//! no repetition is given; the repetition index defaults to the first
//! repetition. All indices are 1-based — position 0 is the segment name.

use crate::error::{Hl7Error, Hl7Result};

/// A parsed addressing path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segment: String,
    field: Option<usize>,
    repetition: Option<usize>,
    component: Option<usize>,
    subcomponent: Option<usize>,
}

impl Path {
    /// Parse a dot path. Bad syntax surfaces as a lookup error since the
    /// path can never resolve to a node.
    pub fn parse(path: &str) -> Hl7Result<Path> {
        let mut parts = path.split('.');
        let segment = parts.next().unwrap_or_default();
        if segment.is_empty() {
            return Err(Hl7Error::Lookup(format!(
                "path {:?} has no segment name",
                path
            )));
        }
        let mut indices = Vec::with_capacity(4);
        for part in parts {
            let index: usize = part.parse().map_err(|_| {
                Hl7Error::Lookup(format!("invalid index {:?} in path {:?}", part, path))
            })?;
            if index == 0 {
                return Err(Hl7Error::Lookup(format!(
                    "index 0 in path {:?}: positions are 1-based",
                    path
                )));
            }
            indices.push(index);
        }
        let (field, repetition, component, subcomponent) = match indices[..] {
            [] => (None, None, None, None),
            [f] => (Some(f), None, None, None),
            [f, c] => (Some(f), None, Some(c), None),
            [f, r, c] => (Some(f), Some(r), Some(c), None),
            [f, r, c, s] => (Some(f), Some(r), Some(c), Some(s)),
            _ => {
                return Err(Hl7Error::Lookup(format!(
                    "path {:?} has too many indices",
                    path
                )))
            }
        };
        Ok(Path {
            segment: segment.to_string(),
            field,
            repetition,
            component,
            subcomponent,
        })
    }

    #[inline]
    pub fn segment(&self) -> &str {
        &self.segment
    }

    #[inline]
    pub fn field(&self) -> Option<usize> {
        self.field
    }

    /// Repetition index, defaulting to the first repetition.
    #[inline]
    pub fn repetition(&self) -> usize {
        self.repetition.unwrap_or(1)
    }

    #[inline]
    pub fn component(&self) -> Option<usize> {
        self.component
    }

    #[inline]
    pub fn subcomponent(&self) -> Option<usize> {
        self.subcomponent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_only() {
        let path = Path::parse("PID").unwrap();
        assert_eq!(path.segment(), "PID");
        assert_eq!(path.field(), None);
    }

    #[test]
    fn test_two_indices_are_field_component() {
        let path = Path::parse("MSH.9.1").unwrap();
        assert_eq!(path.field(), Some(9));
        assert_eq!(path.repetition(), 1);
        assert_eq!(path.component(), Some(1));
        assert_eq!(path.subcomponent(), None);
    }

    #[test]
    fn test_full_path() {
        let path = Path::parse("PID.3.2.4.2").unwrap();
        assert_eq!(path.field(), Some(3));
        assert_eq!(path.repetition(), 2);
        assert_eq!(path.component(), Some(4));
        assert_eq!(path.subcomponent(), Some(2));
    }

    #[test]
    fn test_rejects_bad_paths() {
        assert!(Path::parse("").is_err());
        assert!(Path::parse("PID.x").is_err());
        assert!(Path::parse("PID.0").is_err());
        assert!(Path::parse("PID.1.2.3.4.5").is_err());
    }
}
