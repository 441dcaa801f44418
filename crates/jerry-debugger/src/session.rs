//! Wire state machine of the debugger client.
//!
//! [`DebuggerSession`] consumes logical frames from the transport
//! ([`DebuggerSession::on_message`]), maintains the client-side model of
//! scripts, functions, and breakpoints, and serializes user commands back to
//! the engine. The session is a single-threaded cooperative reactor: it only
//! mutates state inside `on_message` or a command method, both `&mut self`,
//! and never blocks; command completion is delivered through
//! [`PendingRequest`] handles resolved by later inbound frames.

use std::mem;
use std::ops::RangeInclusive;

use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::breakpoints::{
    BreakpointId, BreakpointInfo, BreakpointModel, ParsedFunction, ParserFrame,
};
use crate::cesu8;
use crate::codec::ByteConfig;
use crate::constants::{client, eval, server, JERRY_DEBUGGER_VERSION, RESTART_SENTINEL};
use crate::delegate::{BacktraceFrame, BreakpointHit, DebuggerDelegate, ScriptParsed};
use crate::queue::{Completion, PendingRequest, RequestQueue};
use crate::transport::Transport;
use crate::types::{
    DebuggerError, EvalResult, EvalResultSubtype, OutputSubtype, Result, ScriptId, StopType,
};

/// A script delivered by the engine, immutable once parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    pub id: ScriptId,
    /// Source name; empty when the engine did not announce one.
    pub name: String,
    pub source: String,
}

pub struct DebuggerSession {
    transport: Box<dyn Transport>,
    delegate: Box<dyn DebuggerDelegate>,
    queue: RequestQueue,

    config: Option<ByteConfig>,
    max_message_size: usize,

    /// 1-indexed; index 0 is a sentinel entry.
    scripts: Vec<Script>,
    next_script_id: ScriptId,

    parse_stack: Vec<ParserFrame>,
    /// Finalized functions of the parse in progress, staged until the parser
    /// stack empties. Innermost first.
    new_functions: Vec<ParsedFunction>,
    model: BreakpointModel,

    source_bytes: Option<Vec<u8>>,
    source_name_bytes: Option<Vec<u8>>,
    function_name_bytes: Option<Vec<u8>>,
    exception_bytes: Option<Vec<u8>>,
    eval_result_bytes: Option<Vec<u8>>,
    output_bytes: Option<Vec<u8>>,

    source_name: String,
    /// Name for the next `PARSE_FUNCTION` frame; consumed on use.
    pending_function_name: String,
    exception_string: String,
    backtrace_frames: Vec<BacktraceFrame>,

    /// Present iff the engine is halted at a breakpoint.
    last_breakpoint_hit: Option<BreakpointId>,
    last_stop_type: StopType,
    wait_for_source: bool,
    /// While > 0, the engine intersperses parse traffic with eval output;
    /// source/breakpoint-list/byte-code frames must not be treated as new
    /// parses.
    evals_pending: u32,

    terminated: bool,
}

impl DebuggerSession {
    pub fn new(transport: Box<dyn Transport>, delegate: Box<dyn DebuggerDelegate>) -> Self {
        Self {
            transport,
            delegate,
            queue: RequestQueue::new(),
            config: None,
            max_message_size: 0,
            scripts: vec![Script::default()],
            next_script_id: 1,
            parse_stack: Vec::new(),
            new_functions: Vec::new(),
            model: BreakpointModel::new(),
            source_bytes: None,
            source_name_bytes: None,
            function_name_bytes: None,
            exception_bytes: None,
            eval_result_bytes: None,
            output_bytes: None,
            source_name: String::new(),
            pending_function_name: String::new(),
            exception_string: String::new(),
            backtrace_frames: Vec::new(),
            last_breakpoint_hit: None,
            last_stop_type: StopType::Entry,
            wait_for_source: false,
            evals_pending: 0,
            terminated: false,
        }
    }

    /// Consumes one logical frame from the transport.
    ///
    /// A returned error of kind [`DebuggerError::Protocol`] is fatal: the
    /// session has already reported it through the delegate and rejects all
    /// further traffic.
    pub fn on_message(&mut self, message: &[u8]) -> Result<()> {
        if self.terminated {
            return Err(DebuggerError::ConnectionClosed);
        }
        let Some(&tag) = message.first() else {
            return Err(self.fatal(protocol("empty message")));
        };
        if self.config.is_none() && tag != server::CONFIGURATION {
            return Err(self.fatal(DebuggerError::Protocol(format!(
                "the first message must be CONFIGURATION, got tag {tag}"
            ))));
        }

        trace!(target = "jerry.debugger", tag, len = message.len(), "frame");
        match tag {
            server::CONFIGURATION => self.on_configuration(message),
            server::BYTE_CODE_CP => self.on_byte_code_cp(message),
            server::PARSE_FUNCTION => self.on_parse_function(message),
            server::BREAKPOINT_LIST | server::BREAKPOINT_OFFSET_LIST => {
                self.on_breakpoint_list(message)
            }
            server::SOURCE_CODE | server::SOURCE_CODE_END => self.on_source_code(message),
            server::SOURCE_CODE_NAME | server::SOURCE_CODE_NAME_END => {
                self.on_source_code_name(message)
            }
            server::FUNCTION_NAME | server::FUNCTION_NAME_END => self.on_function_name(message),
            server::RELEASE_BYTE_CODE_CP => self.on_release_byte_code_cp(message),
            server::BREAKPOINT_HIT | server::EXCEPTION_HIT => self.on_execution_hit(message),
            server::EXCEPTION_STR | server::EXCEPTION_STR_END => self.on_exception_str(message),
            server::BACKTRACE | server::BACKTRACE_END => self.on_backtrace(message),
            server::EVAL_RESULT | server::EVAL_RESULT_END => self.on_eval_result(message),
            server::WAIT_FOR_SOURCE => self.on_wait_for_source(),
            server::OUTPUT_RESULT | server::OUTPUT_RESULT_END => self.on_output_result(message),
            other => Err(self.fatal(DebuggerError::Protocol(format!(
                "unexpected message type {other}"
            )))),
        }
    }

    // ---- handshake ------------------------------------------------------

    fn on_configuration(&mut self, message: &[u8]) -> Result<()> {
        if message.len() < 5 {
            return Err(self.fatal(protocol("configuration message too short")));
        }
        let max_message_size = usize::from(message[1]);
        let cpointer_size = message[2];
        let little_endian = message[3] != 0;
        let version = message[4];

        if cpointer_size != 2 && cpointer_size != 4 {
            return Err(self.fatal(DebuggerError::Protocol(format!(
                "invalid compressed pointer size {cpointer_size}"
            ))));
        }
        if version != JERRY_DEBUGGER_VERSION {
            return Err(self.fatal(DebuggerError::Protocol(format!(
                "protocol version mismatch: engine {version}, client {JERRY_DEBUGGER_VERSION}"
            ))));
        }
        if max_message_size < 2 {
            return Err(self.fatal(DebuggerError::Protocol(format!(
                "invalid maximum message size {max_message_size}"
            ))));
        }

        self.max_message_size = max_message_size;
        let config = ByteConfig {
            cpointer_size,
            little_endian,
        };
        match self.config {
            // The byte config is assigned exactly once; a reconfiguration may
            // refresh the message size but never the decoding parameters.
            None => {
                debug!(
                    target = "jerry.debugger",
                    cpointer_size,
                    little_endian,
                    max_message_size,
                    version,
                    "configured"
                );
                self.config = Some(config);
            }
            Some(existing) if existing != config => {
                warn!(
                    target = "jerry.debugger",
                    "ignoring byte-config change after handshake"
                );
            }
            Some(_) => {}
        }
        Ok(())
    }

    // ---- source and function ingestion ----------------------------------

    fn on_source_code(&mut self, message: &[u8]) -> Result<()> {
        if self.evals_pending > 0 {
            return Ok(());
        }
        if self.parse_stack.is_empty() {
            self.parse_stack.push(ParserFrame::top_level(
                self.next_script_id,
                self.source_name.clone(),
            ));
        }
        append(&mut self.source_bytes, &message[1..]);

        if message[0] == server::SOURCE_CODE_END {
            let bytes = self.source_bytes.take().unwrap_or_default();
            let source = cesu8::decode(&bytes).map_err(|err| self.fatal(err))?;
            let id = self.next_script_id;
            let name = self.source_name.clone();
            let line_count = source.matches('\n').count() as u32 + 1;

            let script = Script { id, name, source };
            let index = id as usize;
            if index < self.scripts.len() {
                self.scripts[index] = script;
            } else {
                self.scripts.push(script);
            }

            debug!(target = "jerry.debugger", id, line_count, "script parsed");
            let parsed = ScriptParsed {
                id,
                name: self.scripts[index].name.clone(),
                line_count,
            };
            self.delegate.on_script_parsed(&parsed);
        }
        Ok(())
    }

    fn on_source_code_name(&mut self, message: &[u8]) -> Result<()> {
        append(&mut self.source_name_bytes, &message[1..]);
        if message[0] == server::SOURCE_CODE_NAME_END {
            let bytes = self.source_name_bytes.take().unwrap_or_default();
            self.source_name = cesu8::decode(&bytes).map_err(|err| self.fatal(err))?;
        }
        Ok(())
    }

    fn on_function_name(&mut self, message: &[u8]) -> Result<()> {
        append(&mut self.function_name_bytes, &message[1..]);
        if message[0] == server::FUNCTION_NAME_END {
            let bytes = self.function_name_bytes.take().unwrap_or_default();
            self.pending_function_name = cesu8::decode(&bytes).map_err(|err| self.fatal(err))?;
        }
        Ok(())
    }

    fn on_parse_function(&mut self, message: &[u8]) -> Result<()> {
        let config = self.wire_config()?;
        let values = config
            .decode("II", message, 1)
            .map_err(|err| self.fatal(err))?;
        let name = mem::take(&mut self.pending_function_name);
        trace!(
            target = "jerry.debugger",
            line = values[0],
            column = values[1],
            name = %name,
            "parse function"
        );
        self.parse_stack.push(ParserFrame::function(
            self.next_script_id,
            values[0],
            values[1],
            name,
            self.source_name.clone(),
        ));
        Ok(())
    }

    fn on_breakpoint_list(&mut self, message: &[u8]) -> Result<()> {
        if self.evals_pending > 0 {
            return Ok(());
        }
        if message.len() < 5 || (message.len() - 1) % 4 != 0 {
            return Err(self.fatal(DebuggerError::Protocol(format!(
                "unexpected breakpoint list message length {}",
                message.len()
            ))));
        }
        if self.parse_stack.is_empty() {
            return Err(self.fatal(protocol("breakpoint list without an active parse")));
        }

        let config = self.wire_config()?;
        let count = (message.len() - 1) / 4;
        let values = config
            .decode(&"I".repeat(count), message, 1)
            .map_err(|err| self.fatal(err))?;

        if let Some(frame) = self.parse_stack.last_mut() {
            if message[0] == server::BREAKPOINT_LIST {
                frame.lines.extend(values);
            } else {
                frame.offsets.extend(values);
            }
        }
        Ok(())
    }

    fn on_byte_code_cp(&mut self, message: &[u8]) -> Result<()> {
        if self.evals_pending > 0 {
            return Ok(());
        }
        let config = self.wire_config()?;
        let cp = config
            .decode("C", message, 1)
            .map_err(|err| self.fatal(err))?[0];
        let Some(frame) = self.parse_stack.pop() else {
            return Err(self.fatal(protocol("byte code pointer without an active parse")));
        };

        let func = ParsedFunction::finalize(cp, frame).map_err(|err| self.fatal(err))?;
        trace!(target = "jerry.debugger", cp, "function finalized");
        self.new_functions.push(func);

        if self.parse_stack.is_empty() {
            for func in self.new_functions.drain(..) {
                self.model.insert(func);
            }
            self.next_script_id += 1;
        }
        Ok(())
    }

    fn on_release_byte_code_cp(&mut self, message: &[u8]) -> Result<()> {
        if self.evals_pending > 0 {
            return Ok(());
        }
        let config = self.wire_config()?;
        let cp = config
            .decode("C", message, 1)
            .map_err(|err| self.fatal(err))?[0];

        if let Some(staged) = self
            .new_functions
            .iter()
            .position(|func| func.byte_code_cp == cp)
        {
            self.new_functions.remove(staged);
        } else {
            self.model.release(cp);
        }

        // Echo the frame back with the tag rewritten so the engine can free
        // the bytecode.
        let mut ack = message.to_vec();
        ack[0] = client::FREE_BYTE_CODE_CP;
        if !self.transport.send(&ack) {
            debug!(
                target = "jerry.debugger",
                cp, "failed to acknowledge byte code release"
            );
        }
        Ok(())
    }

    // ---- execution events -----------------------------------------------

    fn on_execution_hit(&mut self, message: &[u8]) -> Result<()> {
        let config = self.wire_config()?;
        let values = config
            .decode("CI", message, 1)
            .map_err(|err| self.fatal(err))?;
        let (id, exact) = self
            .model
            .resolve_offset(values[0], values[1])
            .map_err(|err| self.fatal(err))?;

        self.last_breakpoint_hit = Some(id);
        let stop_type = mem::take(&mut self.last_stop_type);
        let info = self.model.info(id).map_err(|err| self.fatal(err))?;
        let hit = BreakpointHit {
            breakpoint: info,
            exact,
        };

        if message[0] == server::EXCEPTION_HIT {
            let text = mem::take(&mut self.exception_string);
            debug!(target = "jerry.debugger", breakpoint = %hit.breakpoint, "exception hit");
            self.delegate.on_exception_hit(&hit, &text);
        } else {
            // The entry stop always lands on a never-enabled breakpoint; the
            // "inactive" prefix only applies to command-caused stops.
            let inactive = hit.breakpoint.active_index < 0 && stop_type != StopType::Entry;
            let label = format!(
                "{}breakpoint ({})",
                if inactive { "inactive " } else { "" },
                stop_type.label()
            );
            debug!(target = "jerry.debugger", breakpoint = %hit.breakpoint, label = %label, "breakpoint hit");
            self.delegate.on_breakpoint_hit(&hit, &label);
        }
        Ok(())
    }

    fn on_exception_str(&mut self, message: &[u8]) -> Result<()> {
        append(&mut self.exception_bytes, &message[1..]);
        if message[0] == server::EXCEPTION_STR_END {
            let bytes = self.exception_bytes.take().unwrap_or_default();
            self.exception_string = cesu8::decode(&bytes).map_err(|err| self.fatal(err))?;
        }
        Ok(())
    }

    fn on_backtrace(&mut self, message: &[u8]) -> Result<()> {
        let config = self.wire_config()?;
        let frame_size = usize::from(config.cpointer_size) + 4;
        if (message.len() - 1) % frame_size != 0 {
            return Err(self.fatal(DebuggerError::Protocol(format!(
                "unexpected backtrace message length {}",
                message.len()
            ))));
        }

        let count = (message.len() - 1) / frame_size;
        for index in 0..count {
            let values = config
                .decode("CI", message, 1 + index * frame_size)
                .map_err(|err| self.fatal(err))?;
            let (id, exact) = self
                .model
                .resolve_offset(values[0], values[1])
                .map_err(|err| self.fatal(err))?;
            let breakpoint = self.model.info(id).map_err(|err| self.fatal(err))?;
            self.backtrace_frames.push(BacktraceFrame { breakpoint, exact });
        }

        if message[0] == server::BACKTRACE_END {
            let frames = mem::take(&mut self.backtrace_frames);
            self.delegate.on_backtrace(&frames);
            self.queue
                .complete_backtrace(self.transport.as_mut(), frames);
        }
        Ok(())
    }

    fn on_eval_result(&mut self, message: &[u8]) -> Result<()> {
        append(&mut self.eval_result_bytes, &message[1..]);
        if message[0] == server::EVAL_RESULT_END {
            let bytes = self.eval_result_bytes.take().unwrap_or_default();
            let Some((&subtype_byte, value_bytes)) = bytes.split_last() else {
                return Err(self.fatal(protocol("empty eval result")));
            };
            let Some(subtype) = EvalResultSubtype::from_wire(subtype_byte) else {
                return Err(self.fatal(DebuggerError::Protocol(format!(
                    "unknown eval result subtype {subtype_byte}"
                ))));
            };
            let value = cesu8::decode(value_bytes).map_err(|err| self.fatal(err))?;

            self.evals_pending = self.evals_pending.saturating_sub(1);
            self.delegate.on_eval_result(subtype, &value);
            self.queue
                .complete_eval(self.transport.as_mut(), EvalResult { subtype, value });
        }
        Ok(())
    }

    fn on_output_result(&mut self, message: &[u8]) -> Result<()> {
        append(&mut self.output_bytes, &message[1..]);
        if message[0] == server::OUTPUT_RESULT_END {
            let bytes = self.output_bytes.take().unwrap_or_default();
            let Some((&subtype_byte, text_bytes)) = bytes.split_last() else {
                return Err(self.fatal(protocol("empty output result")));
            };
            let Some(subtype) = OutputSubtype::from_wire(subtype_byte) else {
                return Err(self.fatal(DebuggerError::Protocol(format!(
                    "unknown output subtype {subtype_byte}"
                ))));
            };
            let text = cesu8::decode(text_bytes).map_err(|err| self.fatal(err))?;
            self.delegate.on_output_result(subtype, &text);
        }
        Ok(())
    }

    fn on_wait_for_source(&mut self) -> Result<()> {
        self.wait_for_source = true;
        self.delegate.on_wait_for_source();
        Ok(())
    }

    // ---- outgoing commands ----------------------------------------------

    /// Steps to the next statement, entering calls.
    pub fn step_into(&mut self) -> Result<PendingRequest<()>> {
        self.resume_with(StopType::StepInto, client::STEP)
    }

    /// Steps to the next statement in the current function.
    pub fn step_over(&mut self) -> Result<PendingRequest<()>> {
        self.resume_with(StopType::StepOver, client::NEXT)
    }

    /// Runs until the current function returns.
    pub fn step_out(&mut self) -> Result<PendingRequest<()>> {
        self.resume_with(StopType::StepOut, client::FINISH)
    }

    pub fn resume(&mut self) -> Result<PendingRequest<()>> {
        self.resume_with(StopType::Continue, client::CONTINUE)
    }

    fn resume_with(&mut self, stop_type: StopType, tag: u8) -> Result<PendingRequest<()>> {
        self.ensure_live()?;
        self.require_halted()?;
        self.last_breakpoint_hit = None;
        self.last_stop_type = stop_type;
        let pending = self.submit_simple(vec![vec![tag]]);
        self.delegate.on_resume();
        Ok(pending)
    }

    /// Asks the running engine to halt at the next breakpoint location.
    pub fn pause(&mut self) -> Result<PendingRequest<()>> {
        self.ensure_live()?;
        if self.last_breakpoint_hit.is_some() {
            return Err(DebuggerError::AlreadyHalted);
        }
        self.last_stop_type = StopType::Pause;
        Ok(self.submit_simple(vec![vec![client::STOP]]))
    }

    /// Evaluates an expression in the halted engine. Resolves when the
    /// matching `EVAL_RESULT_END` arrives.
    pub fn evaluate(&mut self, expression: &str) -> Result<PendingRequest<EvalResult>> {
        self.ensure_live()?;
        let config = self.wire_config()?;
        self.require_halted()?;

        let packets = self.fragment_string(
            config,
            client::EVAL,
            client::EVAL_PART,
            Some(eval::EVAL),
            expression,
        );
        self.evals_pending += 1;

        let (tx, rx) = oneshot::channel();
        let Self {
            queue, transport, ..
        } = self;
        queue.submit(transport.as_mut(), packets, Completion::Eval(tx));
        Ok(PendingRequest::new(rx))
    }

    /// Aborts the running program by sending the restart sentinel through the
    /// eval channel. The engine resets the context instead of replying, so
    /// this is not tracked as a pending eval.
    pub fn restart(&mut self) -> Result<PendingRequest<()>> {
        self.ensure_live()?;
        let config = self.wire_config()?;
        let packets = self.fragment_string(
            config,
            client::EVAL,
            client::EVAL_PART,
            Some(eval::ABORT),
            RESTART_SENTINEL,
        );
        Ok(self.submit_simple(packets))
    }

    /// Uploads a source program while the engine is waiting for one.
    pub fn send_client_source(&mut self, name: &str, source: &str) -> Result<PendingRequest<()>> {
        self.ensure_live()?;
        let config = self.wire_config()?;
        if !self.wait_for_source {
            return Err(DebuggerError::NotWaitingForSource);
        }
        self.wait_for_source = false;

        let combined = format!("{name}\0{source}");
        let packets = self.fragment_string(
            config,
            client::CLIENT_SOURCE,
            client::CLIENT_SOURCE_PART,
            None,
            &combined,
        );
        Ok(self.submit_simple(packets))
    }

    /// Sends a client-source control frame; `code` must be
    /// [`client::NO_MORE_SOURCES`] or [`client::CONTEXT_RESET`].
    pub fn send_client_source_control(&mut self, code: u8) -> Result<PendingRequest<()>> {
        self.ensure_live()?;
        if code != client::NO_MORE_SOURCES && code != client::CONTEXT_RESET {
            return Err(DebuggerError::InvalidControlCode(code));
        }
        Ok(self.submit_simple(vec![vec![code]]))
    }

    /// Enables or disables a breakpoint on the engine side.
    pub fn update_breakpoint(
        &mut self,
        id: BreakpointId,
        enable: bool,
    ) -> Result<PendingRequest<()>> {
        self.ensure_live()?;
        let config = self.wire_config()?;
        if enable {
            self.model.enable(id)?;
        } else {
            self.model.disable(id)?;
        }
        let offset = self.model.breakpoint(id)?.offset;
        let packet = config.encode(
            "BBCI",
            &[
                u32::from(client::UPDATE_BREAKPOINT),
                u32::from(enable),
                id.func_cp,
                offset,
            ],
        )?;
        Ok(self.submit_simple(vec![packet]))
    }

    /// Requests the call stack of the halted engine. Resolves with the frames
    /// when `BACKTRACE_END` arrives.
    pub fn request_backtrace(&mut self) -> Result<PendingRequest<Vec<BacktraceFrame>>> {
        self.ensure_live()?;
        let config = self.wire_config()?;
        self.require_halted()?;

        let packet = config.encode("BI", &[u32::from(client::GET_BACKTRACE), 0])?;
        let (tx, rx) = oneshot::channel();
        let Self {
            queue, transport, ..
        } = self;
        queue.submit(transport.as_mut(), vec![packet], Completion::Backtrace(tx));
        Ok(PendingRequest::new(rx))
    }

    /// Toggles engine-side exception reporting.
    pub fn set_exception_config(&mut self, enable: bool) -> Result<PendingRequest<()>> {
        self.ensure_live()?;
        let config = self.wire_config()?;
        let packet = config.encode(
            "BB",
            &[u32::from(client::EXCEPTION_CONFIG), u32::from(enable)],
        )?;
        Ok(self.submit_simple(vec![packet]))
    }

    /// Tears the session down: every queued and in-flight request fails with
    /// [`DebuggerError::ConnectionClosed`], and further commands and frames
    /// are rejected. Idempotent.
    pub fn disconnect(&mut self) {
        if self.terminated {
            return;
        }
        debug!(target = "jerry.debugger", "disconnected");
        self.terminated = true;
        self.queue.fail_all(|| DebuggerError::ConnectionClosed);
    }

    // ---- queries ---------------------------------------------------------

    pub fn byte_config(&self) -> Option<ByteConfig> {
        self.config
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Number of scripts parsed so far; valid ids are `1..=script_count()`.
    pub fn script_count(&self) -> u32 {
        (self.scripts.len() - 1) as u32
    }

    pub fn script(&self, id: ScriptId) -> Result<&Script> {
        if id == 0 {
            return Err(DebuggerError::UnknownScript(id));
        }
        self.scripts
            .get(id as usize)
            .ok_or(DebuggerError::UnknownScript(id))
    }

    pub fn get_source(&self, id: ScriptId) -> Result<&str> {
        self.script(id).map(|script| script.source.as_str())
    }

    /// Breakpoint at `line`, resolved through the innermost function covering
    /// it.
    pub fn find_breakpoint(&self, script_id: ScriptId, line: u32) -> Result<BreakpointInfo> {
        if script_id == 0 || script_id > self.script_count() {
            return Err(DebuggerError::UnknownScript(script_id));
        }
        let id = self.model.find_breakpoint(script_id, line)?;
        self.model.info(id)
    }

    /// Distinct breakable lines of a script within `range`, ascending.
    pub fn possible_breakpoints(
        &self,
        script_id: ScriptId,
        range: RangeInclusive<u32>,
    ) -> Result<Vec<u32>> {
        if script_id == 0 || script_id > self.script_count() {
            return Err(DebuggerError::UnknownScript(script_id));
        }
        Ok(self.model.possible_breakpoints(script_id, range))
    }

    pub fn breakpoint_info(&self, id: BreakpointId) -> Result<BreakpointInfo> {
        self.model.info(id)
    }

    pub fn active_breakpoint(&self, index: u32) -> Option<BreakpointInfo> {
        let id = self.model.active_breakpoint(index)?;
        self.model.info(id).ok()
    }

    pub fn last_breakpoint_hit(&self) -> Option<BreakpointInfo> {
        let id = self.last_breakpoint_hit?;
        self.model.info(id).ok()
    }

    pub fn is_waiting_for_source(&self) -> bool {
        self.wait_for_source
    }

    pub fn evals_pending(&self) -> u32 {
        self.evals_pending
    }

    pub fn function_count(&self) -> usize {
        self.model.function_count()
    }

    pub fn active_breakpoint_count(&self) -> usize {
        self.model.active_count()
    }

    // ---- internals -------------------------------------------------------

    fn ensure_live(&self) -> Result<()> {
        if self.terminated {
            return Err(DebuggerError::ConnectionClosed);
        }
        Ok(())
    }

    fn require_halted(&self) -> Result<BreakpointId> {
        self.last_breakpoint_hit.ok_or(DebuggerError::NotHalted)
    }

    fn wire_config(&self) -> Result<ByteConfig> {
        self.config
            .ok_or_else(|| protocol("session is not configured"))
    }

    fn submit_simple(&mut self, packets: Vec<Vec<u8>>) -> PendingRequest<()> {
        let (tx, rx) = oneshot::channel();
        let Self {
            queue, transport, ..
        } = self;
        queue.submit(transport.as_mut(), packets, Completion::Simple(tx));
        PendingRequest::new(rx)
    }

    /// Builds the packets of a string-carrying command: a 5-byte header (tag
    /// plus 32-bit payload length), an optional subtype byte, the CESU-8
    /// text, split into fragments of at most `max_message_size` bytes. The
    /// first fragment keeps `first_tag`; the rest are prefixed with
    /// `part_tag`.
    fn fragment_string(
        &self,
        config: ByteConfig,
        first_tag: u8,
        part_tag: u8,
        subtype: Option<u8>,
        text: &str,
    ) -> Vec<Vec<u8>> {
        let reserve = 5 + usize::from(subtype.is_some());
        let mut buffer = cesu8::encode(text, reserve);
        if let Some(subtype) = subtype {
            buffer[5] = subtype;
        }
        buffer[0] = first_tag;
        let payload_len = (buffer.len() - 5) as u32;
        config.write_uint(&mut buffer[1..5], payload_len);

        let first_len = buffer.len().min(self.max_message_size);
        let mut packets = vec![buffer[..first_len].to_vec()];
        let chunk = self.max_message_size - 1;
        let mut pos = first_len;
        while pos < buffer.len() {
            let end = (pos + chunk).min(buffer.len());
            let mut packet = Vec::with_capacity(end - pos + 1);
            packet.push(part_tag);
            packet.extend_from_slice(&buffer[pos..end]);
            packets.push(packet);
            pos = end;
        }
        packets
    }

    /// Reports a fatal protocol error and poisons the session.
    fn fatal(&mut self, err: DebuggerError) -> DebuggerError {
        warn!(target = "jerry.debugger", error = %err, "fatal protocol error; terminating session");
        self.terminated = true;
        self.queue.fail_all(|| DebuggerError::ConnectionClosed);
        self.delegate.on_error(0, &err.to_string());
        err
    }
}

fn append(buffer: &mut Option<Vec<u8>>, data: &[u8]) {
    buffer.get_or_insert_with(Vec::new).extend_from_slice(data);
}

fn protocol(message: &str) -> DebuggerError {
    DebuggerError::Protocol(message.to_string())
}
