//! Bytecode instructions for a compiled pattern

use crate::api::Flags;
use crate::codepointset::CodePointSet;
use crate::ir::CaptureGroupID;
use std::fmt;

/// A relative jump distance, measured from the instruction following the
/// one that holds it.
pub type JumpOffset = i32;

/// The contents of a bracket, stored out of line in the CompiledRegex.
#[derive(Debug, Clone)]
pub struct BracketContents {
    pub invert: bool,
    pub cps: CodePointSet,
}

/// The list of bytecode instructions.
#[derive(Debug, Clone)]
pub enum Insn {
    /// The match was successful.
    Goal,

    /// Match a single char, canonicalized at compile time under `i`.
    Char(u32),

    /// Match any char; honors dotAll at runtime.
    Any,

    /// Move the position back over one char, without comparing.
    Back,

    /// Match the next char against the bracket contents stored at the given
    /// index in the CompiledRegex.
    Bracket(u32),

    /// Record the current position as a capture group boundary.
    BeginCapture(CaptureGroupID),
    EndCapture(CaptureGroupID),

    /// Clear the capture groups in [from, to).
    ResetCaptures {
        from: CaptureGroupID,
        to: CaptureGroupID,
    },

    /// Match a previously captured range, going right or left.
    BackRef(CaptureGroupID),
    BackRefBackward(CaptureGroupID),

    /// Decrement the loop counter on top of the stack.
    Dec,

    /// Pop a saved position; backtrack if it equals the current position.
    EmptyCheck,

    /// Fork off a backtrack continuation at the given offset; execution
    /// continues here. Greedy polarity.
    ForkCont(JumpOffset),

    /// Fork off a backtrack continuation here; execution continues at the
    /// given offset. Non-greedy polarity.
    ForkNext(JumpOffset),

    /// Unconditional relative jump.
    Jump(JumpOffset),

    /// The ^ and $ anchors.
    LineBegin,
    LineEnd,

    /// Jump back if the counter on top of the stack is still positive.
    Loop(JumpOffset),

    /// Stack bookkeeping.
    Pop,
    Push(usize),
    PushPos,
    PushProc,

    /// Pop a saved position and move there.
    RestorePos,

    /// Pop a thread id and discard every younger thread but the running one.
    RewindProc,

    /// \b or \B.
    WordBoundary { invert: bool },

    /// An instruction that always fails, e.g. for an empty bracket.
    JustFail,
}

/// A compiled pattern: the bytecode and everything needed to run it.
#[derive(Debug, Clone)]
pub struct CompiledRegex {
    /// Sequence of instructions.
    pub insns: Vec<Insn>,

    /// The bracket contents, indexed by the value of `Bracket` instructions.
    pub brackets: Vec<BracketContents>,

    /// Number of capture groups, not counting the whole-match group 0.
    pub groups: CaptureGroupID,

    /// Capture group names: empty if there were none, otherwise one entry
    /// per group with the empty string for unnamed groups.
    pub group_names: Box<[Box<str>]>,

    /// An upper bound on the per-thread stack depth.
    pub max_stack: usize,

    /// Flags controlling matching.
    pub flags: Flags,

    /// The pattern re-serialized from the IR.
    pub pattern: Box<str>,
}

impl fmt::Display for CompiledRegex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Program {{ pattern: /{}/{}, codes:", self.pattern, self.flags)?;
        for (idx, insn) in self.insns.iter().enumerate() {
            writeln!(f, "  {:4}: {:?}", idx, insn)?;
        }
        write!(f, "}}")
    }
}

impl CompiledRegex {
    /// \return the name table entry for a group index, if any.
    pub(crate) fn group_name(&self, index: usize) -> Option<&str> {
        let name = self.group_names.get(index)?;
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}
