//! Client-side model of parsed functions and their breakpoints.
//!
//! Functions live in an arena keyed by their compressed pointer (the
//! engine-side identity); breakpoints are slots inside their owning function
//! and are referenced everywhere by [`BreakpointId`] instead of by pointer, so
//! the function ↔ breakpoint cycle never materializes. Per-script line lists
//! record which functions cover a source line, innermost first.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::RangeInclusive;

use crate::types::{CompressedPointer, DebuggerError, Result, ScriptId};

/// A function definition the engine is still delivering. Pushed on
/// `PARSE_FUNCTION` (or synthesized for top-level code), filled by the
/// breakpoint list messages, and finalized into a [`ParsedFunction`] when the
/// matching `BYTE_CODE_CP` arrives.
#[derive(Clone, Debug)]
pub struct ParserFrame {
    pub is_func: bool,
    pub script_id: ScriptId,
    pub line: u32,
    pub column: u32,
    pub name: String,
    pub source_name: String,
    pub lines: Vec<u32>,
    pub offsets: Vec<u32>,
}

impl ParserFrame {
    /// Frame for global (non-function) code of the script being parsed.
    pub fn top_level(script_id: ScriptId, source_name: String) -> Self {
        Self {
            is_func: false,
            script_id,
            line: 1,
            column: 1,
            name: String::new(),
            source_name,
            lines: Vec::new(),
            offsets: Vec::new(),
        }
    }

    pub fn function(
        script_id: ScriptId,
        line: u32,
        column: u32,
        name: String,
        source_name: String,
    ) -> Self {
        Self {
            is_func: true,
            script_id,
            line,
            column,
            name,
            source_name,
            lines: Vec::new(),
            offsets: Vec::new(),
        }
    }
}

/// Stable reference to a breakpoint: owning function plus slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreakpointId {
    pub(crate) func_cp: CompressedPointer,
    pub(crate) slot: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breakpoint {
    pub script_id: ScriptId,
    pub line: u32,
    pub offset: u32,
    /// Position in the active set, or -1 while inactive.
    pub active_index: i32,
}

#[derive(Clone, Debug)]
pub struct ParsedFunction {
    pub byte_code_cp: CompressedPointer,
    pub script_id: ScriptId,
    pub is_func: bool,
    pub line: u32,
    pub column: u32,
    /// Declared name; empty for anonymous functions and global code.
    pub name: String,
    pub source_name: String,
    breakpoints: Vec<Breakpoint>,
    lines: BTreeMap<u32, usize>,
    offsets: BTreeMap<u32, usize>,
}

impl ParsedFunction {
    /// Builds the function from a popped parser frame, pairing the engine's
    /// line list with its offset list positionally.
    pub(crate) fn finalize(byte_code_cp: CompressedPointer, frame: ParserFrame) -> Result<Self> {
        if frame.lines.len() != frame.offsets.len() {
            return Err(DebuggerError::Protocol(format!(
                "breakpoint line/offset count mismatch: {} lines, {} offsets",
                frame.lines.len(),
                frame.offsets.len()
            )));
        }

        let mut breakpoints = Vec::with_capacity(frame.lines.len());
        let mut lines = BTreeMap::new();
        let mut offsets = BTreeMap::new();
        for (slot, (&line, &offset)) in frame.lines.iter().zip(&frame.offsets).enumerate() {
            breakpoints.push(Breakpoint {
                script_id: frame.script_id,
                line,
                offset,
                active_index: -1,
            });
            lines.insert(line, slot);
            offsets.insert(offset, slot);
        }

        Ok(Self {
            byte_code_cp,
            script_id: frame.script_id,
            is_func: frame.is_func,
            line: frame.line,
            column: frame.column,
            name: frame.name,
            source_name: frame.source_name,
            breakpoints,
            lines,
            offsets,
        })
    }

    /// Name to render toward the user; anonymous functions show as
    /// `function`.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "function"
        } else {
            &self.name
        }
    }

    pub fn first_breakpoint_line(&self) -> Option<u32> {
        self.lines.keys().next().copied()
    }

    pub fn first_breakpoint_offset(&self) -> Option<u32> {
        self.offsets.keys().next().copied()
    }

    pub fn breakpoint_lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines.keys().copied()
    }

    pub fn breakpoint_at_line(&self, line: u32) -> Option<&Breakpoint> {
        self.lines.get(&line).map(|&slot| &self.breakpoints[slot])
    }

    pub fn breakpoint_at_offset(&self, offset: u32) -> Option<&Breakpoint> {
        self.offsets.get(&offset).map(|&slot| &self.breakpoints[slot])
    }
}

/// Snapshot of a breakpoint with its owning function's context, handed to the
/// delegate and to front-end queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakpointInfo {
    pub id: BreakpointId,
    pub script_id: ScriptId,
    pub line: u32,
    pub offset: u32,
    pub active_index: i32,
    pub is_func: bool,
    pub function_name: String,
    pub function_line: u32,
    /// Declaration column; 0 means unknown.
    pub function_column: u32,
    pub source_name: String,
}

impl fmt::Display for BreakpointInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = if self.source_name.is_empty() {
            "<unknown>"
        } else {
            &self.source_name
        };
        write!(f, "{source}:{}", self.line)?;
        if self.is_func {
            let name = if self.function_name.is_empty() {
                "function"
            } else {
                &self.function_name
            };
            write!(
                f,
                " (in {name}() at line:{}, col:{})",
                self.function_line, self.function_column
            )?;
        }
        Ok(())
    }
}

/// Functions, line lists, and the engine-visible active breakpoint set.
#[derive(Debug, Default)]
pub struct BreakpointModel {
    functions: HashMap<CompressedPointer, ParsedFunction>,
    line_lists: HashMap<ScriptId, BTreeMap<u32, Vec<CompressedPointer>>>,
    /// Sparse: deletion leaves a hole, the index is the engine-visible
    /// identifier and is never reused.
    active: BTreeMap<u32, BreakpointId>,
    next_breakpoint_index: u32,
}

impl BreakpointModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promotes a finalized function into the model, appending it to the line
    /// list of every line it can break on. Functions are promoted innermost
    /// first, which makes the head of each line-list cell the innermost
    /// function covering that line.
    pub fn insert(&mut self, func: ParsedFunction) {
        let cell = self.line_lists.entry(func.script_id).or_default();
        for line in func.breakpoint_lines() {
            cell.entry(line).or_default().push(func.byte_code_cp);
        }
        self.functions.insert(func.byte_code_cp, func);
    }

    pub fn function(&self, cp: CompressedPointer) -> Option<&ParsedFunction> {
        self.functions.get(&cp)
    }

    pub fn breakpoint(&self, id: BreakpointId) -> Result<&Breakpoint> {
        self.functions
            .get(&id.func_cp)
            .and_then(|func| func.breakpoints.get(id.slot))
            .ok_or_else(|| DebuggerError::Protocol("stale breakpoint reference".into()))
    }

    fn breakpoint_mut(&mut self, id: BreakpointId) -> Result<&mut Breakpoint> {
        self.functions
            .get_mut(&id.func_cp)
            .and_then(|func| func.breakpoints.get_mut(id.slot))
            .ok_or_else(|| DebuggerError::Protocol("stale breakpoint reference".into()))
    }

    pub fn info(&self, id: BreakpointId) -> Result<BreakpointInfo> {
        let func = self
            .functions
            .get(&id.func_cp)
            .ok_or_else(|| DebuggerError::Protocol("stale breakpoint reference".into()))?;
        let bp = func
            .breakpoints
            .get(id.slot)
            .ok_or_else(|| DebuggerError::Protocol("stale breakpoint reference".into()))?;
        Ok(BreakpointInfo {
            id,
            script_id: bp.script_id,
            line: bp.line,
            offset: bp.offset,
            active_index: bp.active_index,
            is_func: func.is_func,
            function_name: func.name.clone(),
            function_line: func.line,
            function_column: func.column,
            source_name: func.source_name.clone(),
        })
    }

    /// Breakpoint at `line`, taken from the innermost function covering it.
    pub fn find_breakpoint(&self, script_id: ScriptId, line: u32) -> Result<BreakpointId> {
        let missing = || DebuggerError::NoBreakpointAtLine { script_id, line };
        let cell = self
            .line_lists
            .get(&script_id)
            .and_then(|lines| lines.get(&line))
            .ok_or_else(missing)?;
        let func_cp = *cell.first().ok_or_else(missing)?;
        let func = self.functions.get(&func_cp).ok_or_else(missing)?;
        let slot = *func.lines.get(&line).ok_or_else(missing)?;
        Ok(BreakpointId { func_cp, slot })
    }

    /// Maps an engine-reported `(byte_code_cp, offset)` hit location to a
    /// breakpoint. Offsets before the function's first breakpoint snap to it
    /// and count as exact; anything else snaps to the nearest preceding
    /// breakpoint and is reported inexact.
    pub fn resolve_offset(
        &self,
        cp: CompressedPointer,
        offset: u32,
    ) -> Result<(BreakpointId, bool)> {
        let func = self.functions.get(&cp).ok_or_else(|| {
            DebuggerError::Protocol(format!("no function for byte code pointer {cp:#x}"))
        })?;

        if let Some(&slot) = func.offsets.get(&offset) {
            return Ok((BreakpointId { func_cp: cp, slot }, true));
        }

        let (&first_offset, &first_slot) = func.offsets.iter().next().ok_or_else(|| {
            DebuggerError::Protocol(format!("function {cp:#x} has no breakpoints"))
        })?;
        if offset < first_offset {
            return Ok((
                BreakpointId {
                    func_cp: cp,
                    slot: first_slot,
                },
                true,
            ));
        }

        let (_, &slot) = func
            .offsets
            .range(..=offset)
            .next_back()
            .expect("first_offset <= offset");
        Ok((BreakpointId { func_cp: cp, slot }, false))
    }

    /// Distinct breakable lines of a script within `range`, ascending.
    pub fn possible_breakpoints(
        &self,
        script_id: ScriptId,
        range: RangeInclusive<u32>,
    ) -> Vec<u32> {
        self.line_lists
            .get(&script_id)
            .map(|lines| lines.range(range).map(|(&line, _)| line).collect())
            .unwrap_or_default()
    }

    /// Marks the breakpoint active, assigning the next engine-visible index.
    pub fn enable(&mut self, id: BreakpointId) -> Result<u32> {
        let next_index = self.next_breakpoint_index;
        let bp = self.breakpoint_mut(id)?;
        if bp.active_index >= 0 {
            return Err(DebuggerError::AlreadyActive);
        }
        bp.active_index = next_index as i32;
        self.next_breakpoint_index += 1;
        self.active.insert(next_index, id);
        Ok(next_index)
    }

    pub fn disable(&mut self, id: BreakpointId) -> Result<()> {
        let bp = self.breakpoint_mut(id)?;
        if bp.active_index < 0 {
            return Err(DebuggerError::AlreadyInactive);
        }
        let index = bp.active_index as u32;
        bp.active_index = -1;
        self.active.remove(&index);
        Ok(())
    }

    pub fn active_breakpoint(&self, index: u32) -> Option<BreakpointId> {
        self.active.get(&index).copied()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Removes a released function: clears the active slots of its
    /// breakpoints and scrubs it out of every line-list cell. A pointer that
    /// was never promoted is a no-op.
    pub fn release(&mut self, cp: CompressedPointer) {
        let Some(func) = self.functions.remove(&cp) else {
            return;
        };
        for bp in &func.breakpoints {
            if bp.active_index >= 0 {
                self.active.remove(&(bp.active_index as u32));
            }
        }
        if let Some(lines) = self.line_lists.get_mut(&func.script_id) {
            for line in func.breakpoint_lines() {
                if let Some(cell) = lines.get_mut(&line) {
                    cell.retain(|&entry| entry != cp);
                    if cell.is_empty() {
                        lines.remove(&line);
                    }
                }
            }
        }
    }
}
