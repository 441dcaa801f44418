//! Wire protocol constants shared with the engine.
//!
//! The numeric values are a compatibility surface: they must match the
//! engine's debugger header byte for byte. Message kinds the client does not
//! speak (memory statistics, parser waiting, scope-chain inspection) are
//! intentionally absent, which is why the numbering has gaps.

/// Version byte the engine must announce in its `CONFIGURATION` frame.
pub const JERRY_DEBUGGER_VERSION: u8 = 9;

/// Messages sent by the engine to the client.
pub mod server {
    pub const CONFIGURATION: u8 = 1;
    pub const BYTE_CODE_CP: u8 = 3;
    pub const PARSE_FUNCTION: u8 = 4;
    pub const BREAKPOINT_LIST: u8 = 5;
    pub const BREAKPOINT_OFFSET_LIST: u8 = 6;
    pub const SOURCE_CODE: u8 = 7;
    pub const SOURCE_CODE_END: u8 = 8;
    pub const SOURCE_CODE_NAME: u8 = 9;
    pub const SOURCE_CODE_NAME_END: u8 = 10;
    pub const FUNCTION_NAME: u8 = 11;
    pub const FUNCTION_NAME_END: u8 = 12;
    pub const RELEASE_BYTE_CODE_CP: u8 = 14;
    pub const BREAKPOINT_HIT: u8 = 16;
    pub const EXCEPTION_HIT: u8 = 17;
    pub const EXCEPTION_STR: u8 = 18;
    pub const EXCEPTION_STR_END: u8 = 19;
    pub const BACKTRACE: u8 = 21;
    pub const BACKTRACE_END: u8 = 22;
    pub const EVAL_RESULT: u8 = 23;
    pub const EVAL_RESULT_END: u8 = 24;
    pub const WAIT_FOR_SOURCE: u8 = 25;
    pub const OUTPUT_RESULT: u8 = 26;
    pub const OUTPUT_RESULT_END: u8 = 27;
}

/// Messages sent by the client to the engine.
pub mod client {
    pub const FREE_BYTE_CODE_CP: u8 = 1;
    pub const UPDATE_BREAKPOINT: u8 = 2;
    pub const EXCEPTION_CONFIG: u8 = 3;
    pub const STOP: u8 = 6;
    pub const CLIENT_SOURCE: u8 = 8;
    pub const CLIENT_SOURCE_PART: u8 = 9;
    pub const NO_MORE_SOURCES: u8 = 10;
    pub const CONTEXT_RESET: u8 = 11;
    pub const CONTINUE: u8 = 12;
    pub const STEP: u8 = 13;
    pub const NEXT: u8 = 14;
    pub const FINISH: u8 = 15;
    pub const GET_BACKTRACE: u8 = 16;
    pub const EVAL: u8 = 17;
    pub const EVAL_PART: u8 = 18;
}

/// Subtype prefix byte of an outgoing `EVAL` payload.
pub mod eval {
    pub const EVAL: u8 = 0;
    pub const THROW: u8 = 1;
    pub const ABORT: u8 = 2;
}

/// Sentinel expression sent with [`eval::ABORT`] to restart the engine.
pub const RESTART_SENTINEL: &str = "r353t";
