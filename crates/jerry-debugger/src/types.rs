use thiserror::Error;

/// Engine-side identity of a compiled function. The wire representation is 2
/// or 4 bytes wide as declared by the handshake; the client always widens to
/// `u32`.
pub type CompressedPointer = u32;

/// Index into the session's script table. Scripts are 1-indexed; 0 is a
/// sentinel and never a valid script.
pub type ScriptId = u32;

/// The user command responsible for the engine's current halt, used to label
/// stop events toward the front-end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StopType {
    /// No command caused the stop (initial breakpoint after connect).
    #[default]
    Entry,
    StepInto,
    StepOver,
    StepOut,
    Continue,
    Pause,
}

impl StopType {
    pub fn label(self) -> &'static str {
        match self {
            StopType::Entry => "entry",
            StopType::StepInto => "step-in",
            StopType::StepOver => "step",
            StopType::StepOut => "step-out",
            StopType::Continue => "continue",
            StopType::Pause => "pause",
        }
    }
}

/// Final byte of a reassembled `EVAL_RESULT` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalResultSubtype {
    Ok,
    Error,
}

impl EvalResultSubtype {
    pub(crate) fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(EvalResultSubtype::Ok),
            2 => Some(EvalResultSubtype::Error),
            _ => None,
        }
    }
}

/// Final byte of a reassembled `OUTPUT_RESULT` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputSubtype {
    Ok,
    Error,
    Warning,
    Debug,
    Trace,
}

impl OutputSubtype {
    pub(crate) fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(OutputSubtype::Ok),
            2 => Some(OutputSubtype::Error),
            3 => Some(OutputSubtype::Warning),
            4 => Some(OutputSubtype::Debug),
            5 => Some(OutputSubtype::Trace),
            _ => None,
        }
    }
}

/// Completed evaluation delivered by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalResult {
    pub subtype: EvalResultSubtype,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum DebuggerError {
    #[error("engine is not halted at a breakpoint")]
    NotHalted,

    #[error("engine is already halted at a breakpoint")]
    AlreadyHalted,

    #[error("breakpoint is already active")]
    AlreadyActive,

    #[error("breakpoint is already inactive")]
    AlreadyInactive,

    #[error("engine is not waiting for a client source")]
    NotWaitingForSource,

    #[error("invalid client source control code {0}")]
    InvalidControlCode(u8),

    #[error("failed to submit request")]
    TransportSubmitFailed,

    #[error("unknown script id {0}")]
    UnknownScript(ScriptId),

    #[error("no breakpoint at script {script_id} line {line}")]
    NoBreakpointAtLine { script_id: ScriptId, line: u32 },

    #[error("invalid serial configuration: {0}")]
    InvalidSerialConfig(String),

    #[error("invalid CESU-8 sequence")]
    InvalidCesu8,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, DebuggerError>;
