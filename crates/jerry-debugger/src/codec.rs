//! Endian-aware integer codec driven by protocol format strings.
//!
//! A format string describes the fixed layout of a message:
//!
//! - `B`: one unsigned byte
//! - `I`: unsigned 32-bit integer, endianness per [`ByteConfig`]
//! - `C`: compressed pointer, 2 or 4 bytes wide per [`ByteConfig`]
//!
//! Pointer width and endianness are announced by the engine in the
//! `CONFIGURATION` handshake, so every encode/decode goes through a
//! [`ByteConfig`] instead of baking in 32-bit or little-endian assumptions.

use crate::types::{DebuggerError, Result};

/// Byte-level parameters of a session, fixed by the handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteConfig {
    /// Width of a compressed pointer on the wire: 2 or 4.
    pub cpointer_size: u8,
    pub little_endian: bool,
}

impl ByteConfig {
    pub fn new(cpointer_size: u8, little_endian: bool) -> Result<Self> {
        if cpointer_size != 2 && cpointer_size != 4 {
            return Err(DebuggerError::Protocol(format!(
                "invalid compressed pointer size {cpointer_size}"
            )));
        }
        Ok(Self {
            cpointer_size,
            little_endian,
        })
    }

    fn width(self, spec: u8) -> Result<usize> {
        match spec {
            b'B' => Ok(1),
            b'I' => Ok(4),
            b'C' if self.cpointer_size == 2 || self.cpointer_size == 4 => {
                Ok(usize::from(self.cpointer_size))
            }
            b'C' => Err(DebuggerError::Protocol(format!(
                "invalid compressed pointer size {}",
                self.cpointer_size
            ))),
            other => Err(DebuggerError::Protocol(format!(
                "unknown format character {:?}",
                char::from(other)
            ))),
        }
    }

    /// Total byte length of a message with the given format.
    pub fn size(self, format: &str) -> Result<usize> {
        let mut total = 0;
        for spec in format.bytes() {
            total += self.width(spec)?;
        }
        Ok(total)
    }

    /// Encodes `values` according to `format` into a fresh buffer of exactly
    /// [`ByteConfig::size`] bytes.
    pub fn encode(self, format: &str, values: &[u32]) -> Result<Vec<u8>> {
        if format.len() != values.len() {
            return Err(DebuggerError::Protocol(format!(
                "format {format:?} expects {} values, got {}",
                format.len(),
                values.len()
            )));
        }

        let mut out = Vec::with_capacity(self.size(format)?);
        for (spec, &value) in format.bytes().zip(values) {
            let width = self.width(spec)?;
            let max = match width {
                1 => 0xFF,
                2 => 0xFFFF,
                _ => u32::MAX,
            };
            if value > max {
                return Err(DebuggerError::Protocol(format!(
                    "value {value} out of range for format character {:?}",
                    char::from(spec)
                )));
            }
            self.put_uint(&mut out, value, width);
        }
        Ok(out)
    }

    /// Decodes `format` from `message` starting at `offset`, returning one
    /// unsigned integer per format character.
    pub fn decode(self, format: &str, message: &[u8], offset: usize) -> Result<Vec<u32>> {
        let needed = self.size(format)?;
        if offset.checked_add(needed).map_or(true, |end| end > message.len()) {
            return Err(DebuggerError::Protocol(format!(
                "message too short: format {format:?} needs {needed} bytes at offset {offset}, have {}",
                message.len()
            )));
        }

        let mut values = Vec::with_capacity(format.len());
        let mut pos = offset;
        for spec in format.bytes() {
            let width = self.width(spec)?;
            values.push(self.get_uint(&message[pos..pos + width]));
            pos += width;
        }
        Ok(values)
    }

    /// Writes the low `width` bytes of `value` honoring the session
    /// endianness. Used for the length field of fragmented commands, whose
    /// header is patched into an already-encoded CESU-8 buffer.
    pub fn put_uint(self, out: &mut Vec<u8>, value: u32, width: usize) {
        let bytes = value.to_le_bytes();
        if self.little_endian {
            out.extend_from_slice(&bytes[..width]);
        } else {
            out.extend(bytes[..width].iter().rev());
        }
    }

    /// Overwrites `slot` with `value` honoring the session endianness.
    pub fn write_uint(self, slot: &mut [u8], value: u32) {
        let bytes = value.to_le_bytes();
        let width = slot.len();
        if self.little_endian {
            slot.copy_from_slice(&bytes[..width]);
        } else {
            for (dst, src) in slot.iter_mut().zip(bytes[..width].iter().rev()) {
                *dst = *src;
            }
        }
    }

    fn get_uint(self, bytes: &[u8]) -> u32 {
        let mut value = 0u32;
        if self.little_endian {
            for &b in bytes.iter().rev() {
                value = (value << 8) | u32::from(b);
            }
        } else {
            for &b in bytes {
                value = (value << 8) | u32::from(b);
            }
        }
        value
    }
}
