//! Backtracking executor for compiled [`Program`]s.
//!
//! All offsets are **byte** offsets into the subject and always fall on
//! character boundaries.
//!
//! Execution is depth-first. Choice points and capture undo entries share one
//! explicit stack, so on failure popping the stack first rolls back every
//! slot written since the choice point and then resumes its alternative.
//!
//! For programs whose outcome depends only on `(pc, pos)`, a [`Cache`]
//! remembers states that are known to fail. A scan passes the same cache to
//! every attempt, so states explored by an earlier attempt are not explored
//! again.

use crate::program::{Inst, InstPtr, Program};
use crate::syntax::char_class::charset_matches;

/// Largest failure memo (in bits) the executor will allocate for one attempt.
pub const MEMO_BIT_LIMIT: usize = 1 << 24;

/// Runtime limits for a single match attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecLimits {
    /// Maximum instructions executed per attempt (default: unlimited).
    pub(crate) step_limit: Option<u64>,
}

impl ExecLimits {
    /// Create limits with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-attempt step limit.
    pub fn step_limit(mut self, steps: u64) -> Self {
        self.step_limit = Some(steps);
        self
    }

    /// The per-attempt step limit, or `None` when attempts are unbounded.
    pub fn max_steps(&self) -> Option<u64> {
        self.step_limit
    }
}

/// Outcome of one match attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Slot values at the time `Match` was reached.
    Matched(Vec<Option<usize>>),
    NoMatch,
    /// The attempt ran out of steps before reaching a verdict.
    StepLimitExceeded,
}

/// Failure memo for one program over one subject.
#[derive(Debug)]
pub struct Cache {
    visited: Option<Visited>,
}

impl Cache {
    pub fn new(program: &Program, subject: &str) -> Self {
        let visited = if program.is_memoizable() {
            Visited::new(program.insts.len(), subject.len() + 1)
        } else {
            None
        };
        Self { visited }
    }
}

/// Run `program` against `subject`, starting exactly at `start`.
///
/// A `start` past the end of the subject or inside a multi-byte character
/// never matches.
pub fn execute(program: &Program, subject: &str, start: usize, limits: ExecLimits) -> Outcome {
    execute_with(program, subject, start, limits, &mut Cache::new(program, subject))
}

/// Like [`execute`], reusing `cache` from earlier attempts with the same
/// program and subject.
pub fn execute_with(
    program: &Program,
    subject: &str,
    start: usize,
    limits: ExecLimits,
    cache: &mut Cache,
) -> Outcome {
    if start > subject.len() || !subject.is_char_boundary(start) {
        return Outcome::NoMatch;
    }
    let outcome = Executor::new(program, subject, limits, cache.visited.as_mut()).run(start);
    // Only a finished failure proves every visited state fails.
    if !matches!(outcome, Outcome::NoMatch)
        && let Some(visited) = cache.visited.as_mut()
    {
        visited.clear();
    }
    outcome
}

enum Frame {
    /// Resume at `pc` with the input at `pos`.
    Retry { pc: InstPtr, pos: usize },
    /// Put `old` back into `slot`.
    Restore { slot: usize, old: Option<usize> },
}

enum Step {
    Matched,
    Failed,
    OutOfSteps,
}

struct Executor<'p, 's, 'c> {
    program: &'p Program,
    subject: &'s str,
    slots: Vec<Option<usize>>,
    stack: Vec<Frame>,
    visited: Option<&'c mut Visited>,
    steps_left: Option<u64>,
}

impl<'p, 's, 'c> Executor<'p, 's, 'c> {
    fn new(
        program: &'p Program,
        subject: &'s str,
        limits: ExecLimits,
        visited: Option<&'c mut Visited>,
    ) -> Self {
        Self {
            program,
            subject,
            slots: vec![None; program.slot_count()],
            stack: Vec::new(),
            visited,
            steps_left: limits.step_limit,
        }
    }

    fn run(mut self, start: usize) -> Outcome {
        self.stack.push(Frame::Retry { pc: 0, pos: start });
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Restore { slot, old } => self.slots[slot] = old,
                Frame::Retry { pc, pos } => match self.step(pc, pos) {
                    Step::Matched => return Outcome::Matched(self.slots),
                    Step::Failed => {}
                    Step::OutOfSteps => return Outcome::StepLimitExceeded,
                },
            }
        }
        Outcome::NoMatch
    }

    /// Follow one thread from `(pc, pos)` until it matches or fails.
    fn step(&mut self, mut pc: InstPtr, mut pos: usize) -> Step {
        let program = self.program;
        let subject = self.subject;
        loop {
            if let Some(left) = self.steps_left.as_mut() {
                if *left == 0 {
                    return Step::OutOfSteps;
                }
                *left -= 1;
            }
            if let Some(visited) = self.visited.as_mut()
                && !visited.insert(pc, pos)
            {
                return Step::Failed;
            }

            match &program.insts[pc] {
                Inst::Char(c) => match subject[pos..].chars().next() {
                    Some(ch) if ch == *c => {
                        pos += ch.len_utf8();
                        pc += 1;
                    }
                    _ => return Step::Failed,
                },
                Inst::Set(cs) => match subject[pos..].chars().next() {
                    Some(ch) if charset_matches(cs, ch) => {
                        pos += ch.len_utf8();
                        pc += 1;
                    }
                    _ => return Step::Failed,
                },
                Inst::Split { first, second } => {
                    self.stack.push(Frame::Retry { pc: *second, pos });
                    pc = *first;
                }
                Inst::Jump(target) => pc = *target,
                Inst::SaveStart(g) => {
                    self.save(2 * g, pos);
                    pc += 1;
                }
                Inst::SaveEnd(g) => {
                    self.save(2 * g + 1, pos);
                    pc += 1;
                }
                Inst::BackRef(g) => match group_text(&self.slots, subject, *g) {
                    Some(text) if subject[pos..].starts_with(text) => {
                        pos += text.len();
                        pc += 1;
                    }
                    _ => return Step::Failed,
                },
                Inst::AssertStart if pos == 0 => pc += 1,
                Inst::AssertEnd if pos == subject.len() => pc += 1,
                Inst::AssertStart | Inst::AssertEnd => return Step::Failed,
                Inst::Mark(reg) => {
                    self.save(program.register_slot(*reg), pos);
                    pc += 1;
                }
                Inst::Progress { reg, exit } => {
                    pc = if self.slots[program.register_slot(*reg)] == Some(pos) {
                        *exit
                    } else {
                        pc + 1
                    };
                }
                Inst::Match => return Step::Matched,
            }
        }
    }

    fn save(&mut self, slot: usize, pos: usize) {
        self.stack.push(Frame::Restore {
            slot,
            old: self.slots[slot],
        });
        self.slots[slot] = Some(pos);
    }
}

/// Text captured by group `g`, if the group is closed.
fn group_text<'s>(slots: &[Option<usize>], subject: &'s str, g: usize) -> Option<&'s str> {
    match (slots[2 * g], slots[2 * g + 1]) {
        (Some(start), Some(end)) if start <= end => Some(&subject[start..end]),
        _ => None,
    }
}

/// Bitset of `(pc, pos)` states already explored.
#[derive(Debug)]
struct Visited {
    bits: Vec<u64>,
    stride: usize,
    /// Indices of the non-zero words in `bits`.
    touched: Vec<usize>,
}

impl Visited {
    fn new(insts: usize, positions: usize) -> Option<Self> {
        let total = insts.checked_mul(positions)?;
        if total > MEMO_BIT_LIMIT {
            return None;
        }
        Some(Self {
            bits: vec![0; total.div_ceil(64)],
            stride: positions,
            touched: Vec::new(),
        })
    }

    /// Mark a state; returns false if it was already marked.
    fn insert(&mut self, pc: InstPtr, pos: usize) -> bool {
        let index = pc * self.stride + pos;
        let (word, bit) = (index / 64, 1u64 << (index % 64));
        if self.bits[word] == 0 {
            self.touched.push(word);
        }
        let fresh = self.bits[word] & bit == 0;
        self.bits[word] |= bit;
        fresh
    }

    fn clear(&mut self) {
        for word in self.touched.drain(..) {
            self.bits[word] = 0;
        }
    }
}
