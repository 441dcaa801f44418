//! CESU-8 text codec.
//!
//! The engine transmits every string (sources, names, eval expressions and
//! results, exception messages) as CESU-8: identical to UTF-8 for the Basic
//! Multilingual Plane, but supplementary code points are encoded as a UTF-16
//! surrogate pair with each surrogate written as a three-byte sequence.
//! Four-byte UTF-8 forms never appear on the wire, so platform UTF-8 helpers
//! cannot be reused here.

use crate::types::{DebuggerError, Result};

/// Decodes CESU-8 bytes into a string.
///
/// Surrogate pairs are combined into their supplementary code point; a lone
/// surrogate or a four-byte sequence is an error.
pub fn decode(bytes: &[u8]) -> Result<String> {
    // Decode into UTF-16 code units first; surrogate pairing falls out of the
    // UTF-16 conversion.
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0usize;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(u16::from(b));
            i += 1;
            continue;
        }

        if (b & 0xE0) == 0xC0 {
            if i + 1 >= bytes.len() {
                return Err(DebuggerError::InvalidCesu8);
            }
            let b2 = bytes[i + 1];
            if (b2 & 0xC0) != 0x80 {
                return Err(DebuggerError::InvalidCesu8);
            }
            units.push((u16::from(b & 0x1F) << 6) | u16::from(b2 & 0x3F));
            i += 2;
            continue;
        }

        if (b & 0xF0) == 0xE0 {
            if i + 2 >= bytes.len() {
                return Err(DebuggerError::InvalidCesu8);
            }
            let b2 = bytes[i + 1];
            let b3 = bytes[i + 2];
            if (b2 & 0xC0) != 0x80 || (b3 & 0xC0) != 0x80 {
                return Err(DebuggerError::InvalidCesu8);
            }
            units.push(
                (u16::from(b & 0x0F) << 12) | (u16::from(b2 & 0x3F) << 6) | u16::from(b3 & 0x3F),
            );
            i += 3;
            continue;
        }

        // CESU-8 never uses four-byte sequences.
        return Err(DebuggerError::InvalidCesu8);
    }

    String::from_utf16(&units).map_err(|_| DebuggerError::InvalidCesu8)
}

/// Encodes a string as CESU-8, reserving `reserve` zeroed leading bytes for a
/// caller-supplied header so the whole message can be built in one buffer.
pub fn encode(text: &str, reserve: usize) -> Vec<u8> {
    let mut out = vec![0u8; reserve];
    out.reserve(text.len());
    for ch in text.chars() {
        let cp = u32::from(ch);
        if cp < 0x80 {
            out.push(cp as u8);
        } else if cp < 0x800 {
            out.push(0xC0 | (cp >> 6) as u8);
            out.push(0x80 | (cp & 0x3F) as u8);
        } else if cp < 0x1_0000 {
            push_three_byte(&mut out, cp as u16);
        } else {
            // Supplementary plane: two three-byte surrogate sequences, never a
            // four-byte UTF-8 form.
            let cp = cp - 0x1_0000;
            push_three_byte(&mut out, 0xD800 | (cp >> 10) as u16);
            push_three_byte(&mut out, 0xDC00 | (cp & 0x3FF) as u16);
        }
    }
    out
}

fn push_three_byte(out: &mut Vec<u8>, unit: u16) {
    out.push(0xE0 | (unit >> 12) as u8);
    out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
    out.push(0x80 | (unit & 0x3F) as u8);
}
