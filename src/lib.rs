//! rustyhl7 - HL7 v2.x message parsing with byte-faithful round trips
//!
//! Pieces:
//! - Encoding: delimiter set + `\F\ \S\ \T\ \R\ \E\` escape codec
//! - DOM: owned Message → Segment → Field → Repetition → Component →
//!   SubComponent tree with three-state (present/empty/null) leaves
//! - Dot-path addressing (`PID.3.1.4.2`) and in-place mutation
//! - ACK/NACK reply synthesis
//! - Length-dispatched HL7 timestamp parsing
//!
//! Everything is synchronous and in-memory: loading bytes from a socket
//! or file and writing replies back is the caller's concern.

mod ack;
mod core;
mod dom;
mod error;
mod path;

pub use crate::core::datetime::{long_date_with_fraction, parse_datetime, parse_datetime_strict};
pub use crate::core::encoding::Encoding;
pub use crate::core::scanner::extract_messages;
pub use crate::dom::{Component, Field, Message, Repetition, Segment, SubComponent, Value, NULL_MARKER};
pub use crate::error::{Hl7Error, Hl7Result};
pub use crate::path::Path;
