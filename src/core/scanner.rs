//! Delimiter scanning using memchr
//!
//! HL7 content hides delimiter characters behind `\..\` escape tokens, so
//! structural splitting must skip over tokens while scanning. All scanning
//! here is byte-based; delimiters are single ASCII bytes, which keeps the
//! slice boundaries valid UTF-8 char boundaries.

use memchr::{memchr, memchr2};

/// MLLP start-of-block byte.
const MLLP_START: u8 = 0x0B;
/// MLLP end-of-block byte (followed by CR).
const MLLP_END: u8 = 0x1C;

/// Split `input` on `sep`, skipping over escape tokens delimited by `esc`.
///
/// A separator hidden inside `\..\` never splits. A lone escape character
/// with no closing introducer is treated as literal content.
pub fn split_escaped<'a>(input: &'a str, sep: u8, esc: u8) -> Vec<&'a str> {
    let bytes = input.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        match memchr2(sep, esc, &bytes[pos..]) {
            None => break,
            Some(offset) => {
                let at = pos + offset;
                if bytes[at] == sep {
                    pieces.push(&input[start..at]);
                    start = at + 1;
                    pos = at + 1;
                } else {
                    // Skip over the whole escape token
                    match memchr(esc, &bytes[at + 1..]) {
                        Some(j) => pos = at + 2 + j,
                        None => pos = at + 1,
                    }
                }
            }
        }
    }
    pieces.push(&input[start..]);
    pieces
}

/// Split a raw message block into segment lines.
///
/// Accepts CR, LF, CRLF and LFCR line breaks, freely mixed; blank and
/// whitespace-only lines are dropped. Also returns the first line break
/// sequence observed so the serializer can reproduce the original framing.
pub fn split_lines(input: &str) -> (Vec<&str>, Option<&'static str>) {
    let bytes = input.as_bytes();
    let mut lines = Vec::new();
    let mut first_break: Option<&'static str> = None;
    let mut start = 0;
    let mut pos = 0;
    while pos < bytes.len() {
        match memchr2(b'\r', b'\n', &bytes[pos..]) {
            None => break,
            Some(offset) => {
                let at = pos + offset;
                push_line(&mut lines, &input[start..at]);
                // CR+LF and LF+CR pair up into a single break
                let paired = at + 1 < bytes.len()
                    && bytes[at + 1] != bytes[at]
                    && matches!(bytes[at + 1], b'\r' | b'\n');
                let brk: &'static str = match (bytes[at], paired) {
                    (b'\r', true) => "\r\n",
                    (b'\n', true) => "\n\r",
                    (b'\r', false) => "\r",
                    _ => "\n",
                };
                first_break.get_or_insert(brk);
                let next = at + if paired { 2 } else { 1 };
                start = next;
                pos = next;
            }
        }
    }
    if start < bytes.len() {
        push_line(&mut lines, &input[start..]);
    }
    (lines, first_break)
}

#[inline]
fn push_line<'a>(lines: &mut Vec<&'a str>, line: &'a str) {
    if !line.trim().is_empty() {
        lines.push(line);
    }
}

/// Extract MLLP-framed payloads (`0x0B … 0x1C 0x0D`) from a block of text.
///
/// Bytes outside a frame are ignored; an unterminated frame is dropped.
/// Transport itself (sockets, framing on the way out) is a collaborator's
/// concern — this only recovers the payloads from already-received text.
pub fn extract_messages(input: &str) -> Vec<&str> {
    let bytes = input.as_bytes();
    let mut payloads = Vec::new();
    let mut pos = 0;
    while let Some(offset) = memchr(MLLP_START, &bytes[pos..]) {
        let start = pos + offset + 1;
        let mut search = start;
        let mut end = None;
        while let Some(j) = memchr(MLLP_END, &bytes[search..]) {
            let at = search + j;
            if bytes.get(at + 1) == Some(&0x0D) {
                end = Some(at);
                break;
            }
            search = at + 1;
        }
        match end {
            Some(end) => {
                payloads.push(&input[start..end]);
                pos = end + 2;
            }
            None => break,
        }
    }
    payloads
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        assert_eq!(split_escaped("a|b||c", b'|', b'\\'), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_split_keeps_trailing_empty() {
        assert_eq!(split_escaped("a|", b'|', b'\\'), vec!["a", ""]);
        assert_eq!(split_escaped("", b'|', b'\\'), vec![""]);
    }

    #[test]
    fn test_split_skips_escape_tokens() {
        // The & inside the token must not split
        assert_eq!(
            split_escaped("a\\X&X\\b&c", b'&', b'\\'),
            vec!["a\\X&X\\b", "c"]
        );
    }

    #[test]
    fn test_split_lone_escape_is_literal() {
        assert_eq!(split_escaped("a\\b|c", b'|', b'\\'), vec!["a\\b", "c"]);
    }

    #[test]
    fn test_split_lines_mixed_endings() {
        let (lines, brk) = split_lines("one\r\ntwo\rthree\nfour");
        assert_eq!(lines, vec!["one", "two", "three", "four"]);
        assert_eq!(brk, Some("\r\n"));
    }

    #[test]
    fn test_split_lines_drops_blank_lines() {
        let (lines, brk) = split_lines("one\r\r   \rtwo\r");
        assert_eq!(lines, vec!["one", "two"]);
        assert_eq!(brk, Some("\r"));
    }

    #[test]
    fn test_split_lines_without_break() {
        let (lines, brk) = split_lines("only");
        assert_eq!(lines, vec!["only"]);
        assert_eq!(brk, None);
    }

    #[test]
    fn test_extract_messages_frames() {
        let block = "noise\x0BMSH|one\x1C\rgap\x0BMSH|two\x1C\rtail";
        assert_eq!(extract_messages(block), vec!["MSH|one", "MSH|two"]);
    }

    #[test]
    fn test_extract_messages_ignores_unterminated_frame() {
        assert_eq!(extract_messages("\x0BMSH|open"), Vec::<&str>::new());
        assert_eq!(extract_messages("no frames at all"), Vec::<&str>::new());
    }
}
