//! Transport seam between the protocol core and a byte-stream driver.
//!
//! Drivers (a WebSocket client, a serial port) live outside this crate; the
//! core only needs their byte-stream contract: deliver one logical frame per
//! [`crate::DebuggerSession::on_message`] call, accept opaque buffers on
//! [`Transport::send`]. A WebSocket driver gets framing for free (one binary
//! message = one frame); a serial driver runs its raw bytes through
//! [`SerialFrameDecoder`].

use std::fmt;
use std::str::FromStr;

use crate::types::{DebuggerError, Result};

/// Outbound half of a connected byte-stream driver.
///
/// Driver lifecycle contract: the connection is established before any frame
/// is delivered to the session, `disconnect` on the driver side is
/// idempotent, and the driver fires its close notification exactly once.
pub trait Transport {
    /// Submits one protocol frame. Returns `false` when the driver could not
    /// accept the buffer; the session treats that as a hard submit failure.
    fn send(&mut self, message: &[u8]) -> bool;
}

/// Splits a raw serial byte stream into protocol frames.
///
/// Each frame on the wire is a 1-byte payload length `N` followed by `N`
/// payload bytes. Chunk boundaries carry no meaning; a frame may arrive
/// spread over many chunks or several frames may share one chunk.
#[derive(Debug, Default)]
pub struct SerialFrameDecoder {
    buffer: Vec<u8>,
}

impl SerialFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers `chunk` and returns every frame completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        loop {
            let Some(&len) = self.buffer.first() else {
                break;
            };
            let total = usize::from(len) + 1;
            if self.buffer.len() < total {
                break;
            }
            frames.push(self.buffer[1..total].to_vec());
            self.buffer.drain(..total);
        }
        frames
    }
}

/// Wraps one protocol frame for a serial wire: 1-byte payload length, then
/// the payload. Payloads larger than 255 bytes cannot be framed; the engine
/// announces a `max_message_size` that fits when it talks serial.
pub fn encode_serial_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let len = u8::try_from(payload.len()).map_err(|_| {
        DebuggerError::Protocol(format!(
            "serial payload of {} bytes exceeds the 255-byte frame limit",
            payload.len()
        ))
    })?;
    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.push(len);
    frame.extend_from_slice(payload);
    Ok(frame)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Parity::None => "N",
            Parity::Odd => "O",
            Parity::Even => "E",
        })
    }
}

/// Serial line parameters, parsed from the 5-field configuration string
/// `port,baud,databits,parity,stopbits`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: u8,
    pub parity: Parity,
    pub stop_bits: u8,
}

impl FromStr for SerialConfig {
    type Err = DebuggerError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| DebuggerError::InvalidSerialConfig(reason.to_string());

        let fields: Vec<&str> = s.split(',').collect();
        let [port, baud, data_bits, parity, stop_bits] = fields[..] else {
            return Err(invalid("expected port,baud,databits,parity,stopbits"));
        };

        if port.is_empty() {
            return Err(invalid("port must not be empty"));
        }
        let baud_rate: u32 = baud.parse().map_err(|_| invalid("baud rate must be a number"))?;
        let data_bits: u8 = data_bits
            .parse()
            .ok()
            .filter(|bits| (5..=8).contains(bits))
            .ok_or_else(|| invalid("data bits must be 5, 6, 7 or 8"))?;
        let parity = match parity {
            "N" => Parity::None,
            "O" => Parity::Odd,
            "E" => Parity::Even,
            _ => return Err(invalid("parity must be N, O or E")),
        };
        let stop_bits: u8 = stop_bits
            .parse()
            .ok()
            .filter(|bits| *bits == 1 || *bits == 2)
            .ok_or_else(|| invalid("stop bits must be 1 or 2"))?;

        Ok(Self {
            port: port.to_string(),
            baud_rate,
            data_bits,
            parity,
            stop_bits,
        })
    }
}
