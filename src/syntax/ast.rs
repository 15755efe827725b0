//! AST types for regular expression patterns.

/// A fully parsed pattern: the root node plus the number of capturing groups.
///
/// Group 0 (the whole match) is implicit and not counted in `group_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub root: Node,
    pub group_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Matches the empty string at any position.
    Empty,
    /// Matches exactly one character from the set.
    Literal(CharSet),
    Concat(Vec<Node>),
    /// Alternatives are tried left to right.
    Alternation(Vec<Node>),
    Repetition {
        child: Box<Node>,
        min: u32,
        /// `None` is unbounded.
        max: Option<u32>,
        greedy: bool,
    },
    /// `index = None` for a non-capturing `(?:...)` group.
    Group {
        index: Option<usize>,
        child: Box<Node>,
    },
    BackReference(usize),
    AnchorStart,
    AnchorEnd,
}

impl Node {
    pub fn char(c: char) -> Self {
        Node::Literal(CharSet::char(c))
    }

    /// True if this node can succeed without consuming input.
    ///
    /// Back-references are treated as possibly empty since the referenced
    /// group may have captured the empty string.
    pub fn can_match_empty(&self) -> bool {
        match self {
            Node::Empty | Node::AnchorStart | Node::AnchorEnd | Node::BackReference(_) => true,
            Node::Literal(_) => false,
            Node::Concat(nodes) => nodes.iter().all(Node::can_match_empty),
            Node::Alternation(nodes) => nodes.iter().any(Node::can_match_empty),
            Node::Repetition { child, min, .. } => *min == 0 || child.can_match_empty(),
            Node::Group { child, .. } => child.can_match_empty(),
        }
    }
}

/// A set of characters, possibly negated.
#[derive(Debug, Clone, PartialEq)]
pub struct CharSet {
    pub negated: bool,
    pub kind: CharSetKind,
}

impl CharSet {
    pub fn char(c: char) -> Self {
        Self {
            negated: false,
            kind: CharSetKind::Char(c),
        }
    }

    pub fn perl(class: PerlClass, negated: bool) -> Self {
        Self {
            negated,
            kind: CharSetKind::Perl(class),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CharSetKind {
    Char(char),
    Any, // . anything but a line terminator
    Perl(PerlClass),
    Custom(Vec<ClassItem>),
}

/// The backslash classes `\d`, `\w` and `\s` (ASCII semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerlClass {
    Digit, // \d [0-9]
    Word,  // \w [A-Za-z0-9_]
    Space, // \s [ \t\n\x0B\f\r]
}

/// One member of a bracketed class.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassItem {
    Single(char),
    Range(char, char),
    /// `\d`, `\W` etc. used inside brackets.
    Perl { class: PerlClass, negated: bool },
}
