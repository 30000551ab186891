//! ACK / NACK synthesis
//!
//! Builds a reply message from a received one: sending and receiving
//! application/facility swapped, a fresh fractional-second timestamp, the
//! control id copied into the new MSH-10 and the appended MSA-2. The
//! source message is read, never mutated.

use log::debug;

use crate::dom::{Field, Message, Segment};
use crate::error::Hl7Result;

impl Message {
    /// Positive acknowledgement: MSA-1 is `AA`.
    pub fn build_ack(&self) -> Hl7Result<Message> {
        self.build_reply("AA", None)
    }

    /// Negative acknowledgement: MSA-1 is the caller-supplied code and
    /// MSA-3 carries the error text.
    pub fn build_nack(&self, code: &str, error_text: &str) -> Hl7Result<Message> {
        self.build_reply(code, Some(error_text))
    }

    fn build_reply(&self, code: &str, error_text: Option<&str>) -> Hl7Result<Message> {
        let msh = self.default_segment("MSH")?;
        // Raw field copies keep escaped content byte-identical in the reply
        let raw = |position: usize| {
            msh.field(position)
                .map(|field| field.raw_value(self.encoding()))
                .unwrap_or_default()
        };
        let control_id = raw(10);

        let mut reply = Message::with_encoding(self.encoding().clone());
        reply.add_msh_segment(
            &raw(5),
            &raw(6),
            &raw(3),
            &raw(4),
            "",
            "ACK",
            &control_id,
            &raw(11),
            &raw(12),
        );
        let mut msa = Segment::new("MSA");
        msa.set_field(1, Field::parse(code, reply.encoding()));
        msa.set_field(2, Field::parse(&control_id, reply.encoding()));
        if let Some(text) = error_text {
            msa.set_field(3, Field::parse(text, reply.encoding()));
        }
        reply.add_segment(msa);
        debug!("built {} reply for control id {:?}", code, control_id);
        Ok(reply)
    }
}
