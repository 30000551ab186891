//! Core HL7 parsing primitives
//!
//! This module contains the fundamental building blocks for HL7 parsing:
//! - Encoding: delimiter configuration + escape-sequence codec
//! - Scanner: escape-aware delimiter splitting using memchr
//! - Datetime: length-dispatched HL7 timestamp parsing

pub mod datetime;
pub mod encoding;
pub mod scanner;

pub use encoding::Encoding;
