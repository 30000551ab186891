//! DOM Module - the owned HL7 message tree
//!
//! Message → Segment → Field → Repetition → Component → SubComponent.
//! Each parent exclusively owns its children's storage; a node exists only
//! while owned by its parent and no node outlives its message. Value
//! layers (repetition/component/subcomponent) are materialized only where
//! the wire text actually shows multiplicity, which is what makes
//! serialization byte-faithful.

pub mod component;
pub mod field;
pub mod message;
pub mod segment;
pub mod value;

pub use component::{Component, SubComponent};
pub use field::{Field, Repetition};
pub use message::Message;
pub use segment::Segment;
pub use value::{Value, NULL_MARKER};
