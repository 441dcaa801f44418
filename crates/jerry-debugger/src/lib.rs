//! Client-side implementation of the JerryScript remote debugger protocol.
//!
//! This crate is the wire-level core a debug-adapter front-end builds on: it
//! reassembles the engine's fragmented binary messages into logical events
//! (script parsed, breakpoint hit, backtrace, eval result), maintains the
//! client-side model of scripts, functions, and breakpoints, and serializes
//! user commands (stepping, breakpoint updates, evaluation, source upload)
//! back to the engine while respecting its framing and size limits.
//!
//! The adapter façade, the WebSocket client, and the serial-port driver are
//! external collaborators: they feed whole frames into
//! [`DebuggerSession::on_message`] and implement [`Transport`] for the
//! outbound direction. The session itself is a single-threaded cooperative
//! reactor and never blocks; tracked commands hand back a [`PendingRequest`]
//! that resolves when the engine's terminating frame arrives.

pub mod breakpoints;
pub mod cesu8;
pub mod codec;
pub mod constants;
pub mod delegate;
mod queue;
mod session;
pub mod transport;
pub mod types;

pub use breakpoints::{Breakpoint, BreakpointId, BreakpointInfo, ParsedFunction};
pub use codec::ByteConfig;
pub use delegate::{BacktraceFrame, BreakpointHit, DebuggerDelegate, NoopDelegate, ScriptParsed};
pub use queue::PendingRequest;
pub use session::{DebuggerSession, Script};
pub use transport::{SerialConfig, SerialFrameDecoder, Transport};
pub use types::{
    CompressedPointer, DebuggerError, EvalResult, EvalResultSubtype, OutputSubtype, Result,
    ScriptId, StopType,
};
