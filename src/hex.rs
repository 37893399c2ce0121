/// Text form of captured payloads.
///
/// Uppercase hex, two digits per byte, single spaces between bytes and
/// none at either end: `[0xDE, 0xAD]` is `"DE AD"`.
use heapless::{String, Vec};

use crate::config::MAX_PACKET_LEN;

/// Worst case: two digits plus a separator per byte, minus the last separator.
pub const MAX_HEX_LEN: usize = MAX_PACKET_LEN * 3;

/// Buffer type for an encoded payload
pub type HexString = String<MAX_HEX_LEN>;

const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encode `bytes` as spaced uppercase hex. Input beyond
/// [`MAX_PACKET_LEN`] bytes is ignored.
pub fn encode_hex(bytes: &[u8]) -> HexString {
    let mut out = HexString::new();
    for (i, &b) in bytes.iter().take(MAX_PACKET_LEN).enumerate() {
        if i > 0 {
            let _ = out.push(' ');
        }
        let _ = out.push(DIGITS[(b >> 4) as usize] as char);
        let _ = out.push(DIGITS[(b & 0x0F) as usize] as char);
    }
    out
}

/// Decode text produced by [`encode_hex`]. Accepts lowercase digits too;
/// rejects anything else, including stray or doubled separators.
pub fn decode_hex(text: &str) -> Option<Vec<u8, MAX_PACKET_LEN>> {
    let mut out = Vec::new();
    if text.is_empty() {
        return Some(out);
    }
    for pair in text.split(' ') {
        let digits = pair.as_bytes();
        if digits.len() != 2 {
            return None;
        }
        let byte = (nibble(digits[0])? << 4) | nibble(digits[1])?;
        out.push(byte).ok()?;
    }
    Some(out)
}

fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}
