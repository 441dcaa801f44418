//! Callback surface toward the debug-adapter front-end.

use crate::breakpoints::BreakpointInfo;
use crate::types::{EvalResultSubtype, OutputSubtype, ScriptId};

/// A script the engine finished parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptParsed {
    pub id: ScriptId,
    /// Source name; may be empty when the engine did not announce one.
    pub name: String,
    pub line_count: u32,
}

/// An engine halt at (or near) a breakpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakpointHit {
    pub breakpoint: BreakpointInfo,
    /// False when the reported bytecode offset had to be snapped to the
    /// nearest preceding breakpoint.
    pub exact: bool,
}

/// A stack frame reported by `BACKTRACE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub breakpoint: BreakpointInfo,
    pub exact: bool,
}

/// Receiver for session events, driven in inbound frame order.
///
/// Every method has a no-op default so a façade only implements what it
/// surfaces. The session finishes its own state updates before calling out,
/// and no method receives a handle back into the session, so callbacks cannot
/// re-enter the handler.
pub trait DebuggerDelegate {
    fn on_script_parsed(&mut self, _script: &ScriptParsed) {}

    fn on_breakpoint_hit(&mut self, _hit: &BreakpointHit, _stop_label: &str) {}

    fn on_exception_hit(&mut self, _hit: &BreakpointHit, _message: &str) {}

    fn on_backtrace(&mut self, _frames: &[BacktraceFrame]) {}

    fn on_eval_result(&mut self, _subtype: EvalResultSubtype, _value: &str) {}

    fn on_output_result(&mut self, _subtype: OutputSubtype, _message: &str) {}

    fn on_wait_for_source(&mut self) {}

    fn on_resume(&mut self) {}

    fn on_error(&mut self, _code: u32, _message: &str) {}
}

/// Delegate that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDelegate;

impl DebuggerDelegate for NoopDelegate {}
