//! Instruction program produced by the compiler and run by the executor.

use std::fmt;

use crate::syntax::ast::{CharSet, CharSetKind, ClassItem, PerlClass};

/// Index of an instruction within a [`Program`].
pub type InstPtr = usize;

/// A compiled pattern.
///
/// Slots `2 * g` and `2 * g + 1` hold the start and end offsets of group `g`;
/// progress registers follow the group slots.
#[derive(Debug, Clone)]
pub struct Program {
    pub insts: Vec<Inst>,
    /// Number of capturing groups, excluding group 0.
    pub group_count: usize,
    /// Number of `Mark`/`Progress` registers.
    pub register_count: usize,
    pub has_back_references: bool,
}

impl Program {
    /// Total number of slots an executor must allocate.
    pub fn slot_count(&self) -> usize {
        2 * (self.group_count + 1) + self.register_count
    }

    /// Slot index of progress register `reg`.
    pub fn register_slot(&self, reg: usize) -> usize {
        2 * (self.group_count + 1) + reg
    }

    /// True if the executor may prune `(pc, offset)` states that already
    /// failed. Back-references and progress registers make the outcome of
    /// a state depend on more than its position.
    pub fn is_memoizable(&self) -> bool {
        !self.has_back_references && self.register_count == 0
    }
}

/// A single instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Inst {
    /// Consume exactly this character.
    Char(char),
    /// Consume one character from the set.
    Set(CharSet),
    /// Continue at `first`; on backtrack resume at `second`.
    Split { first: InstPtr, second: InstPtr },
    Jump(InstPtr),
    SaveStart(usize),
    SaveEnd(usize),
    /// Consume the text captured by a closed group.
    BackRef(usize),
    AssertStart,
    AssertEnd,
    /// Record the current offset in a progress register.
    Mark(usize),
    /// Continue if input was consumed since the matching `Mark`, otherwise
    /// leave the loop at `exit` keeping the empty iteration's captures.
    Progress { reg: usize, exit: InstPtr },
    Match,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pc, inst) in self.insts.iter().enumerate() {
            writeln!(f, "{pc:04} {inst}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inst::Char(c) => write!(f, "char {c:?}"),
            Inst::Set(cs) => write!(f, "set {}", DisplaySet(cs)),
            Inst::Split { first, second } => write!(f, "split {first}, {second}"),
            Inst::Jump(target) => write!(f, "jump {target}"),
            Inst::SaveStart(g) => write!(f, "save-start {g}"),
            Inst::SaveEnd(g) => write!(f, "save-end {g}"),
            Inst::BackRef(g) => write!(f, "backref {g}"),
            Inst::AssertStart => write!(f, "assert-start"),
            Inst::AssertEnd => write!(f, "assert-end"),
            Inst::Mark(r) => write!(f, "mark {r}"),
            Inst::Progress { reg, exit } => write!(f, "progress {reg}, {exit}"),
            Inst::Match => write!(f, "match"),
        }
    }
}

/// Renders a set back in pattern syntax.
struct DisplaySet<'a>(&'a CharSet);

impl fmt::Display for DisplaySet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cs = self.0;
        match &cs.kind {
            CharSetKind::Char(c) if cs.negated => write!(f, "[^{c}]"),
            CharSetKind::Char(c) => write!(f, "{c}"),
            CharSetKind::Any if cs.negated => write!(f, "[^.]"),
            CharSetKind::Any => write!(f, "."),
            CharSetKind::Perl(class) => write!(f, "{}", perl_escape(*class, cs.negated)),
            CharSetKind::Custom(items) => {
                write!(f, "[{}", if cs.negated { "^" } else { "" })?;
                for item in items {
                    match item {
                        ClassItem::Single(c) => write!(f, "{c}")?,
                        ClassItem::Range(lo, hi) => write!(f, "{lo}-{hi}")?,
                        ClassItem::Perl { class, negated } => {
                            write!(f, "{}", perl_escape(*class, *negated))?
                        }
                    }
                }
                write!(f, "]")
            }
        }
    }
}

fn perl_escape(class: PerlClass, negated: bool) -> &'static str {
    match (class, negated) {
        (PerlClass::Digit, false) => "\\d",
        (PerlClass::Digit, true) => "\\D",
        (PerlClass::Word, false) => "\\w",
        (PerlClass::Word, true) => "\\W",
        (PerlClass::Space, false) => "\\s",
        (PerlClass::Space, true) => "\\S",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(insts: Vec<Inst>, group_count: usize) -> Program {
        Program {
            insts,
            group_count,
            register_count: 0,
            has_back_references: false,
        }
    }

    #[test]
    fn slot_layout() {
        let mut p = program(vec![Inst::Match], 2);
        p.register_count = 3;
        assert_eq!(p.slot_count(), 9);
        assert_eq!(p.register_slot(0), 6);
        assert_eq!(p.register_slot(2), 8);
    }

    #[test]
    fn memoizable_only_without_backrefs_or_registers() {
        let mut p = program(vec![Inst::Match], 1);
        assert!(p.is_memoizable());
        p.has_back_references = true;
        assert!(!p.is_memoizable());
        p.has_back_references = false;
        p.register_count = 1;
        assert!(!p.is_memoizable());
    }

    #[test]
    fn display_listing() {
        let p = program(
            vec![
                Inst::SaveStart(0),
                Inst::Set(CharSet {
                    negated: true,
                    kind: CharSetKind::Custom(vec![
                        ClassItem::Range('a', 'c'),
                        ClassItem::Perl {
                            class: PerlClass::Digit,
                            negated: false,
                        },
                    ]),
                }),
                Inst::Split {
                    first: 1,
                    second: 3,
                },
                Inst::SaveEnd(0),
                Inst::Match,
            ],
            0,
        );
        assert_eq!(
            p.to_string(),
            "0000 save-start 0\n\
             0001 set [^a-c\\d]\n\
             0002 split 1, 3\n\
             0003 save-end 0\n\
             0004 match\n"
        );
    }
}
