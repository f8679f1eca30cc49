//! Compiler back-end: lowers IR into a CompiledRegex

use crate::charclasses;
use crate::codepointset::CodePointSet;
use crate::folds;
use crate::insn::{BracketContents, CompiledRegex, Insn};
use crate::ir;
use crate::ir::{ClassItem, EscapeClass, Node};
use crate::parse::{error, Error};
use crate::printer;
use crate::unicode;

/// The direction the cursor moves while matching; flipped inside
/// lookbehinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// Type which wraps up the context needed to emit a CompiledRegex.
struct Emitter<'r> {
    re: &'r ir::RegExp,
    insns: Vec<Insn>,
    brackets: Vec<BracketContents>,

    // Current and maximum stack depth, tracked structurally so that the
    // precomputed bound holds on every execution path.
    depth: usize,
    max_depth: usize,
}

impl<'r> Emitter<'r> {
    /// Emit an instruction.
    fn emit_insn(&mut self, insn: Insn) {
        self.insns.push(insn);
    }

    /// \return the offset of the next instruction emitted.
    fn next_offset(&self) -> usize {
        self.insns.len()
    }

    /// Emit an instruction whose offset will be patched later, returning its
    /// location.
    fn emit_insn_offset(&mut self, insn: Insn) -> usize {
        let ret = self.next_offset();
        self.emit_insn(insn);
        ret
    }

    /// Point the jump-like instruction at \p site to \p target.
    fn patch_jump(&mut self, site: usize, target: usize) {
        let offset = target as i64 - (site as i64 + 1);
        let offset = offset as i32;
        match &mut self.insns[site] {
            Insn::ForkCont(k) | Insn::ForkNext(k) | Insn::Jump(k) | Insn::Loop(k) => *k = offset,
            other => unreachable!("Not a patchable instruction: {:?}", other),
        }
    }

    fn push_depth(&mut self, n: usize) {
        self.depth += n;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn pop_depth(&mut self, n: usize) {
        debug_assert!(self.depth >= n, "Stack depth underflow");
        self.depth -= n;
    }

    /// Emit a single-char consuming instruction, wrapping it in Back
    /// instructions when the cursor moves backwards.
    fn emit_consuming(&mut self, insn: Insn, dir: Direction) {
        if dir == Direction::Backward {
            self.emit_insn(Insn::Back);
            self.emit_insn(insn);
            self.emit_insn(Insn::Back);
        } else {
            self.emit_insn(insn);
        }
    }

    /// Resolve an escape class to its base char-set plus an invert flag.
    fn escape_class_set(&self, escape: &EscapeClass) -> Result<(bool, CodePointSet), Error> {
        match escape {
            EscapeClass::Digit { invert } => Ok((
                *invert,
                CodePointSet::from_sorted_disjoint_ranges(charclasses::DIGITS.to_vec()),
            )),
            EscapeClass::Word { invert } => {
                let mut cps =
                    CodePointSet::from_sorted_disjoint_ranges(charclasses::WORD_CHARS.to_vec());
                if self.re.flags.unicode && self.re.flags.icase {
                    // The two code points which case-fold into ASCII word
                    // chars join the set. ES9 21.2.2.6.2.
                    cps.add_one(0x017F);
                    cps.add_one(0x212A);
                }
                Ok((*invert, cps))
            }
            EscapeClass::Space { invert } => {
                let mut cps =
                    CodePointSet::from_sorted_disjoint_ranges(charclasses::WHITESPACE.to_vec());
                for r in charclasses::LINE_TERMINATORS.iter() {
                    cps.add(r.begin, r.end);
                }
                Ok((*invert, cps))
            }
            EscapeClass::Property { invert, name } => match unicode::load_property(name) {
                Some(cps) => Ok((*invert, cps)),
                None => error("Invalid property name"),
            },
            EscapeClass::PropertyValue {
                invert,
                name,
                value,
            } => match unicode::load_property_value(name, value) {
                Some(cps) => Ok((*invert, cps)),
                None => error("Invalid property name"),
            },
        }
    }

    /// Lower a bracket class to its contents.
    fn class_to_bracket(&self, invert: bool, items: &[ClassItem]) -> Result<BracketContents, Error> {
        let mut cps = CodePointSet::new();
        for item in items {
            match item {
                ClassItem::Char(c) => cps.add_one(c.cp),
                ClassItem::Range(begin, end) => {
                    debug_assert!(begin.cp <= end.cp);
                    cps.add(begin.cp, end.cp + 1);
                }
                ClassItem::Escape(escape) => {
                    let (inv, set) = self.escape_class_set(escape)?;
                    if inv {
                        let mut set = set;
                        set.invert();
                        cps.add_set(&set);
                    } else {
                        cps.add_set(&set);
                    }
                }
            }
        }
        Ok(BracketContents { invert, cps })
    }

    /// Emit a bracket match.
    fn emit_bracket(&mut self, bc: BracketContents, dir: Direction) {
        if !bc.invert && bc.cps.is_empty() {
            // An empty bracket matches nothing at all.
            self.emit_insn(Insn::JustFail);
            return;
        }
        let idx = self.brackets.len() as u32;
        self.brackets.push(bc);
        self.emit_consuming(Insn::Bracket(idx), dir);
    }

    /// Emit the per-iteration prelude and body of a loop: the cap-reset over
    /// enclosed groups, the empty check around nullable bodies, and the body
    /// itself.
    fn emit_loop_body(&mut self, child: &Node, dir: Direction) -> Result<(), Error> {
        if let Some((from, to)) = child.capture_range() {
            self.emit_insn(Insn::ResetCaptures { from, to });
        }
        let needs_empty_check = !child.always_advances();
        if needs_empty_check {
            self.emit_insn(Insn::PushPos);
            self.push_depth(1);
        }
        self.compile_node(child, dir)?;
        if needs_empty_check {
            self.emit_insn(Insn::EmptyCheck);
            self.pop_depth(1);
        }
        Ok(())
    }

    /// Emit the fork-topped loop shared by `*`, the tail of `+`, and
    /// unbounded repeat tails.
    fn emit_many_loop(&mut self, child: &Node, non_greedy: bool, dir: Direction) -> Result<(), Error> {
        let fork = self.emit_insn_offset(if non_greedy {
            Insn::ForkNext(0)
        } else {
            Insn::ForkCont(0)
        });
        self.emit_loop_body(child, dir)?;
        let jump = self.emit_insn_offset(Insn::Jump(0));
        self.patch_jump(jump, fork);
        let exit = self.next_offset();
        self.patch_jump(fork, exit);
        Ok(())
    }

    /// Emit a counted loop of up to \p count optional iterations.
    fn emit_bounded_loop(
        &mut self,
        child: &Node,
        count: usize,
        non_greedy: bool,
        dir: Direction,
    ) -> Result<(), Error> {
        debug_assert!(count > 0);
        self.emit_insn(Insn::Push(count));
        self.push_depth(1);
        let fork = self.emit_insn_offset(if non_greedy {
            Insn::ForkNext(0)
        } else {
            Insn::ForkCont(0)
        });
        self.emit_loop_body(child, dir)?;
        self.emit_insn(Insn::Dec);
        let back = self.emit_insn_offset(Insn::Loop(0));
        self.patch_jump(back, fork);
        let exit = self.next_offset();
        self.patch_jump(fork, exit);
        self.emit_insn(Insn::Pop);
        self.pop_depth(1);
        Ok(())
    }

    /// Emit a lookaround assertion. Both senses share the proc-rewind
    /// layout; lookbehind compiles its body with the cursor reversed.
    fn emit_lookaround(&mut self, child: &Node, negative: bool, backwards: bool) -> Result<(), Error> {
        let body_dir = if backwards {
            Direction::Backward
        } else {
            Direction::Forward
        };
        let entry_depth = self.depth;
        self.emit_insn(Insn::PushPos);
        self.emit_insn(Insn::PushProc);
        self.push_depth(2);
        if !negative {
            self.compile_node(child, body_dir)?;
            self.emit_insn(Insn::RewindProc);
            self.emit_insn(Insn::RestorePos);
        } else {
            let fork = self.emit_insn_offset(Insn::ForkCont(0));
            self.compile_node(child, body_dir)?;
            self.emit_insn(Insn::RewindProc);
            self.emit_insn(Insn::JustFail);
            let cont = self.next_offset();
            self.patch_jump(fork, cont);
            self.emit_insn(Insn::Pop);
            self.emit_insn(Insn::RestorePos);
        }
        // Both the success and failure arms leave the stack balanced.
        self.depth = entry_depth;
        Ok(())
    }

    /// Emit instructions corresponding to a given node.
    fn compile_node(&mut self, node: &Node, dir: Direction) -> Result<(), Error> {
        match node {
            Node::Sequence(children) => {
                if dir == Direction::Forward {
                    for child in children {
                        self.compile_node(child, dir)?;
                    }
                } else {
                    for child in children.iter().rev() {
                        self.compile_node(child, dir)?;
                    }
                }
                Ok(())
            }

            Node::Disjunction(children) => {
                debug_assert!(!children.is_empty());
                let mut jumps = Vec::new();
                for (idx, child) in children.iter().enumerate() {
                    if idx + 1 < children.len() {
                        let fork = self.emit_insn_offset(Insn::ForkCont(0));
                        self.compile_node(child, dir)?;
                        jumps.push(self.emit_insn_offset(Insn::Jump(0)));
                        let next_alternative = self.next_offset();
                        self.patch_jump(fork, next_alternative);
                    } else {
                        self.compile_node(child, dir)?;
                    }
                }
                let exit = self.next_offset();
                for jump in jumps {
                    self.patch_jump(jump, exit);
                }
                Ok(())
            }

            Node::Group(child) => self.compile_node(child, dir),

            Node::Capture { index, child } | Node::NamedCapture { index, child, .. } => {
                // Swapped under backward direction so begin <= end holds on
                // the final match.
                if dir == Direction::Forward {
                    self.emit_insn(Insn::BeginCapture(*index));
                    self.compile_node(child, dir)?;
                    self.emit_insn(Insn::EndCapture(*index));
                } else {
                    self.emit_insn(Insn::EndCapture(*index));
                    self.compile_node(child, dir)?;
                    self.emit_insn(Insn::BeginCapture(*index));
                }
                Ok(())
            }

            Node::Optional { child, non_greedy } => {
                let fork = self.emit_insn_offset(if *non_greedy {
                    Insn::ForkNext(0)
                } else {
                    Insn::ForkCont(0)
                });
                self.compile_node(child, dir)?;
                let exit = self.next_offset();
                self.patch_jump(fork, exit);
                Ok(())
            }

            Node::Many { child, non_greedy } => self.emit_many_loop(child, *non_greedy, dir),

            Node::Some { child, non_greedy } => {
                // The first, mandatory iteration; the loop follows it.
                self.compile_node(child, dir)?;
                self.emit_many_loop(child, *non_greedy, dir)
            }

            Node::Repeat {
                child,
                min,
                max,
                non_greedy,
            } => {
                match *min {
                    0 => {}
                    1 => self.compile_node(child, dir)?,
                    min => {
                        self.emit_insn(Insn::Push(min));
                        self.push_depth(1);
                        let top = self.next_offset();
                        if let Some((from, to)) = child.capture_range() {
                            self.emit_insn(Insn::ResetCaptures { from, to });
                        }
                        self.compile_node(child, dir)?;
                        self.emit_insn(Insn::Dec);
                        let back = self.emit_insn_offset(Insn::Loop(0));
                        self.patch_jump(back, top);
                        self.emit_insn(Insn::Pop);
                        self.pop_depth(1);
                    }
                }
                match *max {
                    None => self.emit_many_loop(child, *non_greedy, dir),
                    Some(max) => {
                        debug_assert!(max >= *min);
                        let rest = max - *min;
                        if rest > 0 {
                            self.emit_bounded_loop(child, rest, *non_greedy, dir)?;
                        }
                        Ok(())
                    }
                }
            }

            Node::LookAhead { child, negative } => self.emit_lookaround(child, *negative, false),
            Node::LookBehind { child, negative } => self.emit_lookaround(child, *negative, true),

            Node::LineBegin => {
                self.emit_insn(Insn::LineBegin);
                Ok(())
            }
            Node::LineEnd => {
                self.emit_insn(Insn::LineEnd);
                Ok(())
            }
            Node::WordBoundary { invert } => {
                self.emit_insn(Insn::WordBoundary { invert: *invert });
                Ok(())
            }

            Node::Char(c) => {
                let cp = if self.re.flags.icase {
                    folds::canonicalize(c.cp, self.re.flags.unicode)
                } else {
                    c.cp
                };
                self.emit_consuming(Insn::Char(cp), dir);
                Ok(())
            }

            Node::Dot => {
                self.emit_consuming(Insn::Any, dir);
                Ok(())
            }

            Node::Class { invert, items } => {
                let bc = self.class_to_bracket(*invert, items)?;
                self.emit_bracket(bc, dir);
                Ok(())
            }

            Node::EscapeClass(escape) => {
                let (invert, cps) = self.escape_class_set(escape)?;
                self.emit_bracket(BracketContents { invert, cps }, dir);
                Ok(())
            }

            Node::BackRef(index) | Node::NamedBackRef { index, .. } => {
                if *index == 0 || *index > self.re.group_count {
                    return error(format!(
                        "Backreference \\{} exceeds number of capture groups",
                        index
                    ));
                }
                self.emit_insn(if dir == Direction::Forward {
                    Insn::BackRef(*index)
                } else {
                    Insn::BackRefBackward(*index)
                });
                Ok(())
            }
        }
    }
}

/// Compile the given IR to a CompiledRegex.
pub(crate) fn emit(re: &ir::RegExp) -> Result<CompiledRegex, Error> {
    let mut emitter = Emitter {
        re,
        insns: Vec::new(),
        brackets: Vec::new(),
        depth: 0,
        max_depth: 0,
    };
    emitter.emit_insn(Insn::BeginCapture(0));
    emitter.compile_node(&re.node, Direction::Forward)?;
    emitter.emit_insn(Insn::EndCapture(0));
    emitter.emit_insn(Insn::Goal);
    debug_assert!(emitter.depth == 0, "Unbalanced stack tracking");
    Ok(CompiledRegex {
        insns: emitter.insns,
        brackets: emitter.brackets,
        groups: re.group_count,
        group_names: re.group_names.clone(),
        max_stack: emitter.max_depth,
        flags: re.flags,
        pattern: printer::pattern_to_string(&re.node).into_boxed_str(),
    })
}
