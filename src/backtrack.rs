//! The backtracking execution engine: a stack machine over forked threads.
//!
//! Execution state is a priority-ordered list of threads ("procs"), the
//! running one on top. Fork instructions snapshot the running thread as a
//! backtrack continuation beneath it; when an instruction fails, the top
//! thread is discarded and the next one resumes. Lookarounds record the
//! running thread's id on entry and discard every thread spawned inside the
//! body on exit, so an assertion is never re-matched a different way.

use crate::api::{Flags, Match};
use crate::charclasses;
use crate::exec;
use crate::folds;
use crate::indexing::Input;
use crate::insn::{BracketContents, CompiledRegex, Insn};

/// One slot of a thread's auxiliary stack: a saved position, a loop
/// counter, or a thread-id snapshot. The compiler brackets pushes and pops
/// so each pop finds the kind it expects.
#[derive(Debug, Clone)]
enum StackEntry {
    Pos(usize),
    Counter(usize),
    ProcId(u64),
}

/// A single backtracking thread.
#[derive(Debug, Clone)]
struct Proc {
    pc: usize,
    pos: usize,
    id: u64,
    stack: Vec<StackEntry>,
    caps: Box<[Option<usize>]>,
}

#[inline(always)]
fn offset_pc(pc: usize, offset: i32) -> usize {
    (pc as i64 + offset as i64) as usize
}

/// \return whether two chars compare equal, respecting case folding.
#[inline(always)]
fn chars_match(c1: u32, c2: u32, flags: &Flags) -> bool {
    c1 == c2
        || (flags.icase
            && folds::canonicalize(c1, flags.unicode) == folds::canonicalize(c2, flags.unicode))
}

/// \return whether the bracket \p bc matches the char \p cp, respecting
/// case and the invert flag. Under `i` a char matches if any member of its
/// case-equivalence class is in the set.
fn bracket_matches(bc: &BracketContents, cp: u32, flags: &Flags) -> bool {
    let mut contained = bc.cps.contains(cp);
    if !contained && flags.icase {
        if let Some(orbit) = folds::uncanonicalize(cp, flags.unicode) {
            contained = orbit.iter().any(|&c| c != cp && bc.cps.contains(c));
        }
    }
    contained != bc.invert
}

/// Compare the captured range [begin, end) against the input at *pos,
/// moving right. On success *pos is advanced past the compared text.
fn backref_matches(input: &Input, flags: &Flags, begin: usize, end: usize, pos: &mut usize) -> bool {
    let mut ref_pos = begin;
    while ref_pos < end {
        let Some((c1, w1)) = input.peek_right(ref_pos) else {
            return false;
        };
        let Some((c2, w2)) = input.peek_right(*pos) else {
            return false;
        };
        if !chars_match(c1, c2, flags) {
            return false;
        }
        ref_pos += w1;
        *pos += w2;
    }
    true
}

/// As backref_matches, but comparing leftwards from *pos (for lookbehind).
fn backref_matches_backward(
    input: &Input,
    flags: &Flags,
    begin: usize,
    end: usize,
    pos: &mut usize,
) -> bool {
    let mut ref_pos = end;
    while ref_pos > begin {
        let Some((c1, w1)) = input.peek_left(ref_pos) else {
            return false;
        };
        let Some((c2, w2)) = input.peek_left(*pos) else {
            return false;
        };
        if !chars_match(c1, c2, flags) {
            return false;
        }
        ref_pos -= w1;
        *pos -= w2;
    }
    true
}

#[derive(Debug)]
pub(crate) struct MatchAttempter<'r, 't> {
    re: &'r CompiledRegex,
    input: Input<'t>,
    procs: Vec<Proc>,
    next_id: u64,
}

impl<'r, 't> MatchAttempter<'r, 't> {
    pub(crate) fn new(re: &'r CompiledRegex, input: Input<'t>) -> Self {
        Self {
            re,
            input,
            procs: Vec::new(),
            next_id: 0,
        }
    }

    /// Attempt to match at a given position.
    /// \return the capture offsets on success.
    fn try_at_pos(&mut self, pos: usize) -> Option<Box<[Option<usize>]>> {
        let re = self.re;
        let input = self.input;
        let flags = &re.flags;

        self.procs.clear();
        self.procs.push(Proc {
            pc: 0,
            pos,
            id: 0,
            stack: Vec::with_capacity(re.max_stack),
            caps: vec![None; 2 * (re.groups as usize + 1)].into_boxed_slice(),
        });
        self.next_id = 1;

        while !self.procs.is_empty() {
            let top = self.procs.len() - 1;
            let pc = self.procs[top].pc;
            self.procs[top].pc += 1;
            let insn = &re.insns[pc];

            let failed = match insn {
                Insn::Goal => {
                    let proc = &mut self.procs[top];
                    return Some(std::mem::take(&mut proc.caps));
                }

                &Insn::Char(c) => {
                    let proc = &mut self.procs[top];
                    match input.peek_right(proc.pos) {
                        Some((cc, width)) => {
                            let matched = if flags.icase {
                                folds::canonicalize(cc, flags.unicode) == c
                            } else {
                                cc == c
                            };
                            if matched {
                                proc.pos += width;
                                false
                            } else {
                                true
                            }
                        }
                        None => true,
                    }
                }

                Insn::Any => {
                    let proc = &mut self.procs[top];
                    match input.peek_right(proc.pos) {
                        Some((cc, width))
                            if flags.dot_all || !charclasses::is_line_terminator(cc) =>
                        {
                            proc.pos += width;
                            false
                        }
                        _ => true,
                    }
                }

                Insn::Back => {
                    let proc = &mut self.procs[top];
                    match input.peek_left(proc.pos) {
                        Some((_, width)) => {
                            proc.pos -= width;
                            false
                        }
                        None => true,
                    }
                }

                &Insn::Bracket(idx) => {
                    let bc = &re.brackets[idx as usize];
                    let proc = &mut self.procs[top];
                    match input.peek_right(proc.pos) {
                        Some((cc, width)) if bracket_matches(bc, cc, flags) => {
                            proc.pos += width;
                            false
                        }
                        _ => true,
                    }
                }

                &Insn::BeginCapture(group) => {
                    let proc = &mut self.procs[top];
                    proc.caps[2 * group as usize] = Some(proc.pos);
                    false
                }

                &Insn::EndCapture(group) => {
                    let proc = &mut self.procs[top];
                    proc.caps[2 * group as usize + 1] = Some(proc.pos);
                    false
                }

                &Insn::ResetCaptures { from, to } => {
                    let proc = &mut self.procs[top];
                    for group in from..to {
                        proc.caps[2 * group as usize] = None;
                        proc.caps[2 * group as usize + 1] = None;
                    }
                    false
                }

                &Insn::BackRef(group) => {
                    let proc = &mut self.procs[top];
                    let gi = group as usize;
                    match (proc.caps[2 * gi], proc.caps[2 * gi + 1]) {
                        (Some(begin), Some(end)) => {
                            !backref_matches(&input, flags, begin, end, &mut proc.pos)
                        }
                        // A group that was never exited matches emptily.
                        _ => false,
                    }
                }

                &Insn::BackRefBackward(group) => {
                    let proc = &mut self.procs[top];
                    let gi = group as usize;
                    match (proc.caps[2 * gi], proc.caps[2 * gi + 1]) {
                        (Some(begin), Some(end)) => {
                            !backref_matches_backward(&input, flags, begin, end, &mut proc.pos)
                        }
                        _ => false,
                    }
                }

                Insn::Dec => {
                    let proc = &mut self.procs[top];
                    match proc.stack.last_mut() {
                        Some(StackEntry::Counter(n)) => {
                            debug_assert!(*n > 0, "Counter underflow");
                            *n -= 1;
                            false
                        }
                        other => unreachable!("Expected a counter, got {:?}", other),
                    }
                }

                Insn::EmptyCheck => {
                    let proc = &mut self.procs[top];
                    match proc.stack.pop() {
                        Some(StackEntry::Pos(saved)) => saved == proc.pos,
                        other => unreachable!("Expected a position, got {:?}", other),
                    }
                }

                Insn::JustFail => true,

                &Insn::ForkCont(offset) => {
                    // The running thread continues here; the saved thread
                    // resumes at the offset if we backtrack to it.
                    let proc = &mut self.procs[top];
                    let mut saved = proc.clone();
                    saved.pc = offset_pc(proc.pc, offset);
                    proc.id = self.next_id;
                    self.next_id += 1;
                    self.procs.insert(top, saved);
                    false
                }

                &Insn::ForkNext(offset) => {
                    // Roles swapped: the running thread jumps to the offset
                    // and the saved thread holds the fall-through pc.
                    let proc = &mut self.procs[top];
                    let mut saved = proc.clone();
                    proc.pc = offset_pc(proc.pc, offset);
                    proc.id = self.next_id;
                    self.next_id += 1;
                    self.procs.insert(top, saved);
                    false
                }

                &Insn::Jump(offset) => {
                    let proc = &mut self.procs[top];
                    proc.pc = offset_pc(proc.pc, offset);
                    false
                }

                Insn::LineBegin => {
                    let proc = &self.procs[top];
                    let ok = proc.pos == 0
                        || (flags.multiline
                            && input
                                .peek_left(proc.pos)
                                .is_some_and(|(c, _)| charclasses::is_line_terminator(c)));
                    !ok
                }

                Insn::LineEnd => {
                    let proc = &self.procs[top];
                    let ok = proc.pos == input.len()
                        || (flags.multiline
                            && input
                                .peek_right(proc.pos)
                                .is_some_and(|(c, _)| charclasses::is_line_terminator(c)));
                    !ok
                }

                &Insn::Loop(offset) => {
                    let proc = &mut self.procs[top];
                    match proc.stack.last() {
                        Some(&StackEntry::Counter(n)) => {
                            if n > 0 {
                                proc.pc = offset_pc(proc.pc, offset);
                            }
                            false
                        }
                        other => unreachable!("Expected a counter, got {:?}", other),
                    }
                }

                Insn::Pop => {
                    let proc = &mut self.procs[top];
                    proc.stack.pop();
                    false
                }

                &Insn::Push(n) => {
                    let proc = &mut self.procs[top];
                    proc.stack.push(StackEntry::Counter(n));
                    debug_assert!(proc.stack.len() <= re.max_stack, "Stack bound exceeded");
                    false
                }

                Insn::PushPos => {
                    let proc = &mut self.procs[top];
                    proc.stack.push(StackEntry::Pos(proc.pos));
                    debug_assert!(proc.stack.len() <= re.max_stack, "Stack bound exceeded");
                    false
                }

                Insn::PushProc => {
                    let proc = &mut self.procs[top];
                    proc.stack.push(StackEntry::ProcId(proc.id));
                    debug_assert!(proc.stack.len() <= re.max_stack, "Stack bound exceeded");
                    false
                }

                Insn::RestorePos => {
                    let proc = &mut self.procs[top];
                    match proc.stack.pop() {
                        Some(StackEntry::Pos(saved)) => {
                            proc.pos = saved;
                            false
                        }
                        other => unreachable!("Expected a position, got {:?}", other),
                    }
                }

                Insn::RewindProc => {
                    // Discard every thread spawned since the recorded id,
                    // keeping the running one on top.
                    let proc = &mut self.procs[top];
                    let rewind_id = match proc.stack.pop() {
                        Some(StackEntry::ProcId(id)) => id,
                        other => unreachable!("Expected a proc id, got {:?}", other),
                    };
                    let cur = self.procs.pop().unwrap();
                    self.procs.retain(|p| p.id < rewind_id);
                    self.procs.push(cur);
                    false
                }

                &Insn::WordBoundary { invert } => {
                    let proc = &self.procs[top];
                    let word_at = |c: Option<(u32, usize)>| {
                        c.is_some_and(|(c, _)| {
                            charclasses::is_word_char(c, flags.unicode, flags.icase)
                        })
                    };
                    let prev = word_at(input.peek_left(proc.pos));
                    let next = word_at(input.peek_right(proc.pos));
                    let boundary = prev != next;
                    boundary == invert
                }
            };

            if failed {
                self.procs.pop();
            }
        }
        None
    }
}

#[derive(Debug)]
pub struct BacktrackExecutor<'r, 't> {
    matcher: MatchAttempter<'r, 't>,
}

impl<'r, 't> BacktrackExecutor<'r, 't> {
    pub(crate) fn new(re: &'r CompiledRegex, input: Input<'t>) -> Self {
        Self {
            matcher: MatchAttempter::new(re, input),
        }
    }

    fn successful_match(&self, caps: Box<[Option<usize>]>) -> Match {
        let re = self.matcher.re;
        let range = caps[0].expect("Group 0 should have matched")
            ..caps[1].expect("Group 0 should have matched");
        let mut captures = Vec::with_capacity(re.groups as usize);
        for group in 1..=(re.groups as usize) {
            captures.push(match (caps[2 * group], caps[2 * group + 1]) {
                (Some(begin), Some(end)) => Some(begin..end),
                _ => None,
            });
        }
        Match {
            range,
            captures,
            group_names: re.group_names.clone(),
        }
    }
}

impl exec::MatchProducer for BacktrackExecutor<'_, '_> {
    /// The top-level scan: try each position from \p start rightwards, one
    /// char at a time, or just \p start itself when sticky.
    fn next_match(&mut self, start: usize, next_start: &mut Option<usize>) -> Option<Match> {
        let input = self.matcher.input;
        let sticky = self.matcher.re.flags.sticky;
        *next_start = None;
        if start > input.len() {
            return None;
        }
        let mut pos = start;
        loop {
            if let Some(caps) = self.matcher.try_at_pos(pos) {
                let m = self.successful_match(caps);
                // An empty match must not produce the same match again.
                *next_start = if m.range.end != pos {
                    Some(m.range.end)
                } else {
                    input.next_right_pos(m.range.end)
                };
                return Some(m);
            }
            if sticky {
                return None;
            }
            match input.next_right_pos(pos) {
                Some(next) => pos = next,
                None => return None,
            }
        }
    }
}
