//! Compiler from a parsed [`Ast`] to an executable [`Program`].
//!
//! The output is a flat instruction list in the style of a backtracking
//! virtual machine: branching is expressed with `Split`, whose first target
//! is always explored before the second.

use crate::program::{Inst, InstPtr, Program};
use crate::syntax::ast::{Ast, CharSetKind, Node};

/// Upper bound on program length after counted repetitions are expanded.
pub const MAX_PROGRAM_LEN: usize = 1 << 20;

/// Placeholder target, patched once the real target is known.
const HOLE: InstPtr = InstPtr::MAX;

/// Errors raised while lowering an AST.
///
/// Everything except `ProgramTooLarge` indicates a compiler defect: the parser
/// only produces ASTs for which lowering cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    InvalidTarget { pc: InstPtr, target: InstPtr },
    InvalidGroup { pc: InstPtr, group: usize },
    InvalidRegister { pc: InstPtr, register: usize },
    MissingMatch,
    ProgramTooLarge(usize),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTarget { pc, target } => {
                write!(f, "Internal error: instruction {pc} jumps to invalid target {target}")
            }
            Self::InvalidGroup { pc, group } => {
                write!(f, "Internal error: instruction {pc} refers to unknown group {group}")
            }
            Self::InvalidRegister { pc, register } => {
                write!(f, "Internal error: instruction {pc} refers to unknown register {register}")
            }
            Self::MissingMatch => write!(f, "Internal error: program does not end in a match"),
            Self::ProgramTooLarge(limit) => {
                write!(f, "Pattern expands to more than {limit} instructions")
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Compile an AST for unanchored matching.
pub fn compile(ast: &Ast) -> Result<Program, CompileError> {
    Compiler::new(ast.group_count).build(&ast.root, false)
}

/// Compile an AST wrapped in start and end anchors, for whole-subject matching.
pub fn compile_anchored(ast: &Ast) -> Result<Program, CompileError> {
    Compiler::new(ast.group_count).build(&ast.root, true)
}

struct Compiler {
    insts: Vec<Inst>,
    group_count: usize,
    register_count: usize,
    has_back_references: bool,
}

impl Compiler {
    fn new(group_count: usize) -> Self {
        Self {
            insts: Vec::new(),
            group_count,
            register_count: 0,
            has_back_references: false,
        }
    }

    fn build(mut self, root: &Node, anchored: bool) -> Result<Program, CompileError> {
        self.push(Inst::SaveStart(0))?;
        if anchored {
            self.push(Inst::AssertStart)?;
        }
        self.emit(root)?;
        if anchored {
            self.push(Inst::AssertEnd)?;
        }
        self.push(Inst::SaveEnd(0))?;
        self.push(Inst::Match)?;

        let program = Program {
            insts: self.insts,
            group_count: self.group_count,
            register_count: self.register_count,
            has_back_references: self.has_back_references,
        };
        verify(&program)?;
        log::debug!(
            "compiled {} instructions ({} groups, {} registers, anchored={anchored})",
            program.insts.len(),
            program.group_count,
            program.register_count,
        );
        Ok(program)
    }

    fn push(&mut self, inst: Inst) -> Result<InstPtr, CompileError> {
        if self.insts.len() >= MAX_PROGRAM_LEN {
            return Err(CompileError::ProgramTooLarge(MAX_PROGRAM_LEN));
        }
        self.insts.push(inst);
        Ok(self.insts.len() - 1)
    }

    fn next_pc(&self) -> InstPtr {
        self.insts.len()
    }

    fn hole(&mut self) -> Result<InstPtr, CompileError> {
        self.push(Inst::Split {
            first: HOLE,
            second: HOLE,
        })
    }

    fn emit(&mut self, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::Empty => {}
            Node::Literal(cs) => {
                let inst = match cs.kind {
                    CharSetKind::Char(c) if !cs.negated => Inst::Char(c),
                    _ => Inst::Set(cs.clone()),
                };
                self.push(inst)?;
            }
            Node::Concat(nodes) => {
                for node in nodes {
                    self.emit(node)?;
                }
            }
            Node::Alternation(alternatives) => self.emit_alternation(alternatives)?,
            Node::Repetition {
                child,
                min,
                max,
                greedy,
            } => self.emit_repetition(child, *min, *max, *greedy)?,
            Node::Group {
                index: Some(g),
                child,
            } => {
                self.push(Inst::SaveStart(*g))?;
                self.emit(child)?;
                self.push(Inst::SaveEnd(*g))?;
            }
            Node::Group { index: None, child } => self.emit(child)?,
            Node::BackReference(g) => {
                self.has_back_references = true;
                self.push(Inst::BackRef(*g))?;
            }
            Node::AnchorStart => {
                self.push(Inst::AssertStart)?;
            }
            Node::AnchorEnd => {
                self.push(Inst::AssertEnd)?;
            }
        }
        Ok(())
    }

    /// `a|b|c` becomes a chain of splits, each alternative jumping to a
    /// shared exit.
    fn emit_alternation(&mut self, alternatives: &[Node]) -> Result<(), CompileError> {
        let mut exits = Vec::new();
        let last = alternatives.len().saturating_sub(1);
        for (i, alternative) in alternatives.iter().enumerate() {
            if i == last {
                self.emit(alternative)?;
                break;
            }
            let split = self.hole()?;
            self.emit(alternative)?;
            exits.push(self.push(Inst::Jump(HOLE))?);
            self.insts[split] = Inst::Split {
                first: split + 1,
                second: self.next_pc(),
            };
        }
        let end = self.next_pc();
        for pc in exits {
            self.insts[pc] = Inst::Jump(end);
        }
        Ok(())
    }

    /// `x{m,n}` becomes `m` copies of `x` followed by `n - m` optional copies;
    /// an unbounded maximum ends in a loop instead.
    fn emit_repetition(
        &mut self,
        child: &Node,
        min: u32,
        max: Option<u32>,
        greedy: bool,
    ) -> Result<(), CompileError> {
        for _ in 0..min {
            self.emit(child)?;
        }

        let Some(max) = max else {
            return self.emit_loop(child, greedy);
        };

        let mut splits = Vec::new();
        for _ in min..max {
            splits.push(self.hole()?);
            self.emit(child)?;
        }
        let end = self.next_pc();
        for split in splits {
            self.insts[split] = branch(split + 1, end, greedy);
        }
        Ok(())
    }

    fn emit_loop(&mut self, child: &Node, greedy: bool) -> Result<(), CompileError> {
        let head = self.hole()?;

        // A pass that consumes nothing ends the loop instead of repeating.
        let register = if child.can_match_empty() {
            let reg = self.register_count;
            self.register_count += 1;
            self.push(Inst::Mark(reg))?;
            Some(reg)
        } else {
            None
        };

        self.emit(child)?;
        let progress = match register {
            Some(reg) => Some((reg, self.push(Inst::Progress { reg, exit: HOLE })?)),
            None => None,
        };
        self.push(Inst::Jump(head))?;

        let exit = self.next_pc();
        self.insts[head] = branch(head + 1, exit, greedy);
        if let Some((reg, pc)) = progress {
            self.insts[pc] = Inst::Progress { reg, exit };
        }
        Ok(())
    }
}

/// Greedy repetition prefers the body; lazy prefers the exit.
fn branch(body: InstPtr, exit: InstPtr, greedy: bool) -> Inst {
    if greedy {
        Inst::Split {
            first: body,
            second: exit,
        }
    } else {
        Inst::Split {
            first: exit,
            second: body,
        }
    }
}

/// Check the structural invariants the executor relies on.
pub fn verify(program: &Program) -> Result<(), CompileError> {
    let len = program.insts.len();
    let check_target = |pc: InstPtr, target: InstPtr| {
        if target < len {
            Ok(())
        } else {
            Err(CompileError::InvalidTarget { pc, target })
        }
    };
    let check_group = |pc: InstPtr, group: usize| {
        if group <= program.group_count {
            Ok(())
        } else {
            Err(CompileError::InvalidGroup { pc, group })
        }
    };

    for (pc, inst) in program.insts.iter().enumerate() {
        match inst {
            Inst::Split { first, second } => {
                check_target(pc, *first)?;
                check_target(pc, *second)?;
            }
            Inst::Jump(target) => check_target(pc, *target)?,
            Inst::SaveStart(g) | Inst::SaveEnd(g) | Inst::BackRef(g) => check_group(pc, *g)?,
            Inst::Mark(reg) | Inst::Progress { reg, .. } if *reg >= program.register_count => {
                return Err(CompileError::InvalidRegister { pc, register: *reg });
            }
            Inst::Progress { exit, .. } => check_target(pc, *exit)?,
            _ => {}
        }
    }

    match program.insts.last() {
        Some(Inst::Match) => Ok(()),
        _ => Err(CompileError::MissingMatch),
    }
}
