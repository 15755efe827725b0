//! Recursive descent parser for regular expression patterns.

use itertools::Itertools;
use phf::{Map, phf_map};
use std::iter::Peekable;
use std::str::Chars;

use super::ast::*;

/// Largest bound accepted in a `{m,n}` quantifier.
pub const MAX_REPETITION: u32 = 1000;

/// Deepest group nesting accepted. Parsing and compiling recurse once per
/// level.
pub const MAX_NESTING: usize = 128;

/// Errors that can occur while parsing a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    UnclosedGroup,
    UnmatchedParen,
    UnsupportedGroup,
    UnclosedClass,
    EmptyClass,
    InvalidClassRange(char, char),
    NothingToRepeat(char),
    NestedQuantifier,
    PossessiveQuantifier,
    InvalidRepetition,
    InvalidRepetitionRange(u32, u32),
    RepetitionTooLarge,
    UnknownEscape(char),
    TrailingBackslash,
    InvalidHexEscape,
    InvalidBackReference(usize),
    NestingTooDeep,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnclosedGroup => write!(f, "Unclosed group '(' in pattern"),
            Self::UnmatchedParen => write!(f, "Unmatched closing ')' in pattern"),
            Self::UnsupportedGroup => write!(f, "Unsupported group construct '(?'"),
            Self::UnclosedClass => write!(f, "Unclosed character class '['"),
            Self::EmptyClass => write!(f, "Empty character class"),
            Self::InvalidClassRange(lo, hi) => {
                write!(f, "Invalid character class range {lo:?}-{hi:?}")
            }
            Self::NothingToRepeat(c) => write!(f, "Dangling quantifier {c:?} with nothing to repeat"),
            Self::NestedQuantifier => write!(f, "Quantifier follows another quantifier"),
            Self::PossessiveQuantifier => write!(f, "Possessive quantifiers are not supported"),
            Self::InvalidRepetition => write!(f, "Illegal repetition, expected {{m}}, {{m,}} or {{m,n}}"),
            Self::InvalidRepetitionRange(min, max) => {
                write!(f, "Invalid repetition range {{{min},{max}}}")
            }
            Self::RepetitionTooLarge => {
                write!(f, "Repetition bound exceeds the maximum of {MAX_REPETITION}")
            }
            Self::UnknownEscape(c) => write!(f, "Unknown escape sequence \\{c}"),
            Self::TrailingBackslash => write!(f, "Pattern ends with a lone backslash"),
            Self::InvalidHexEscape => write!(f, "Invalid hexadecimal escape"),
            Self::InvalidBackReference(index) => {
                write!(f, "Back-reference \\{index} refers to a group not yet opened")
            }
            Self::NestingTooDeep => {
                write!(f, "Groups nested deeper than the maximum of {MAX_NESTING}")
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// Result of a backslash escape that stands for one character or a class.
#[derive(Debug, Clone, Copy)]
enum Escape {
    Char(char),
    Perl(PerlClass, bool),
}

/// Single-letter escapes. Keep sorted by letter.
static ESCAPES: Map<char, Escape> = phf_map! {
    'D' => Escape::Perl(PerlClass::Digit, true),
    'S' => Escape::Perl(PerlClass::Space, true),
    'W' => Escape::Perl(PerlClass::Word, true),
    'a' => Escape::Char('\x07'),
    'd' => Escape::Perl(PerlClass::Digit, false),
    'e' => Escape::Char('\x1B'),
    'f' => Escape::Char('\x0C'),
    'n' => Escape::Char('\n'),
    'r' => Escape::Char('\r'),
    's' => Escape::Perl(PerlClass::Space, false),
    't' => Escape::Char('\t'),
    'w' => Escape::Perl(PerlClass::Word, false),
};

/// Parse a pattern string into an [`Ast`].
pub fn parse(input: &str) -> Result<Ast, SyntaxError> {
    let mut parser = Parser {
        chars: input.chars().peekable(),
        group_count: 0,
        depth: 0,
    };
    let root = parser.parse_alternation()?;
    // parse_alternation only stops at end of input or ')'
    if parser.chars.next().is_some() {
        return Err(SyntaxError::UnmatchedParen);
    }
    Ok(Ast {
        root,
        group_count: parser.group_count,
    })
}

struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    /// Capturing groups opened so far.
    group_count: usize,
    /// Groups currently open around the parse position.
    depth: usize,
}

impl Parser<'_> {
    fn parse_alternation(&mut self) -> Result<Node, SyntaxError> {
        let mut alternatives = vec![self.parse_concat()?];
        while self.chars.peek() == Some(&'|') {
            self.chars.next(); // consume '|'
            alternatives.push(self.parse_concat()?);
        }
        if alternatives.len() == 1 {
            return Ok(alternatives.swap_remove(0));
        }
        Ok(Node::Alternation(alternatives))
    }

    fn parse_concat(&mut self) -> Result<Node, SyntaxError> {
        let mut items = Vec::new();
        loop {
            match self.chars.peek() {
                None | Some('|') | Some(')') => break,
                _ => items.push(self.parse_repetition()?),
            }
        }
        Ok(match items.len() {
            0 => Node::Empty,
            1 => items.swap_remove(0),
            _ => Node::Concat(items),
        })
    }

    /// Parse one atom and its optional quantifier.
    fn parse_repetition(&mut self) -> Result<Node, SyntaxError> {
        let atom = self.parse_atom()?;
        let Some((min, max)) = self.parse_quantifier()? else {
            return Ok(atom);
        };

        let greedy = match self.chars.peek() {
            Some('?') => {
                self.chars.next();
                false
            }
            Some('+') => return Err(SyntaxError::PossessiveQuantifier),
            _ => true,
        };
        if matches!(self.chars.peek(), Some('*' | '+' | '?' | '{')) {
            return Err(SyntaxError::NestedQuantifier);
        }

        Ok(Node::Repetition {
            child: Box::new(atom),
            min,
            max,
            greedy,
        })
    }

    /// Try to parse a quantifier suffix. Returns `None` if the next token is
    /// not a quantifier.
    fn parse_quantifier(&mut self) -> Result<Option<(u32, Option<u32>)>, SyntaxError> {
        let bounds = match self.chars.peek() {
            Some('*') => (0, None),
            Some('+') => (1, None),
            Some('?') => (0, Some(1)),
            Some('{') => {
                self.chars.next();
                return Ok(Some(self.parse_brace_quantifier()?));
            }
            _ => return Ok(None),
        };
        self.chars.next();
        Ok(Some(bounds))
    }

    /// Parse `{m}`, `{m,}` or `{m,n}` (the opening `{` has already been consumed).
    fn parse_brace_quantifier(&mut self) -> Result<(u32, Option<u32>), SyntaxError> {
        let min = self.parse_bound()?.ok_or(SyntaxError::InvalidRepetition)?;
        let max = match self.chars.next() {
            Some('}') => Some(min),
            Some(',') => {
                let max = self.parse_bound()?;
                if self.chars.next() != Some('}') {
                    return Err(SyntaxError::InvalidRepetition);
                }
                max
            }
            _ => return Err(SyntaxError::InvalidRepetition),
        };
        if let Some(max) = max
            && min > max
        {
            return Err(SyntaxError::InvalidRepetitionRange(min, max));
        }
        Ok((min, max))
    }

    fn parse_bound(&mut self) -> Result<Option<u32>, SyntaxError> {
        let digits: String = self
            .chars
            .peeking_take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.is_empty() {
            return Ok(None);
        }
        match digits.parse::<u32>() {
            Ok(n) if n <= MAX_REPETITION => Ok(Some(n)),
            _ => Err(SyntaxError::RepetitionTooLarge),
        }
    }

    fn parse_atom(&mut self) -> Result<Node, SyntaxError> {
        // Callers only reach here with a character available.
        let Some(&c) = self.chars.peek() else {
            return Ok(Node::Empty);
        };
        match c {
            '*' | '+' | '?' => Err(SyntaxError::NothingToRepeat(c)),
            '{' => Err(SyntaxError::InvalidRepetition),
            '(' => self.parse_group(),
            '[' => self.parse_class(),
            '\\' => self.parse_escape(),
            '.' => {
                self.chars.next();
                Ok(Node::Literal(CharSet {
                    negated: false,
                    kind: CharSetKind::Any,
                }))
            }
            '^' => {
                self.chars.next();
                Ok(Node::AnchorStart)
            }
            '$' => {
                self.chars.next();
                Ok(Node::AnchorEnd)
            }
            _ => {
                self.chars.next();
                Ok(Node::char(c))
            }
        }
    }

    fn parse_group(&mut self) -> Result<Node, SyntaxError> {
        self.chars.next(); // consume '('
        if self.depth == MAX_NESTING {
            return Err(SyntaxError::NestingTooDeep);
        }
        let index = if self.chars.peek() == Some(&'?') {
            self.chars.next();
            if self.chars.next() != Some(':') {
                return Err(SyntaxError::UnsupportedGroup);
            }
            None
        } else {
            // Numbered on open so the body can refer back to it.
            self.group_count += 1;
            Some(self.group_count)
        };

        self.depth += 1;
        let child = self.parse_alternation()?;
        self.depth -= 1;
        if self.chars.next() != Some(')') {
            return Err(SyntaxError::UnclosedGroup);
        }
        Ok(Node::Group {
            index,
            child: Box::new(child),
        })
    }

    /// Parse a bracketed class `[...]` or `[^...]`.
    fn parse_class(&mut self) -> Result<Node, SyntaxError> {
        self.chars.next(); // consume '['
        let negated = if self.chars.peek() == Some(&'^') {
            self.chars.next();
            true
        } else {
            false
        };

        let mut items = Vec::new();
        loop {
            let lo = match self.chars.next() {
                None => return Err(SyntaxError::UnclosedClass),
                Some(']') => break,
                Some('\\') => match self.parse_escape_char()? {
                    Escape::Char(c) => c,
                    Escape::Perl(class, negated) => {
                        items.push(ClassItem::Perl { class, negated });
                        continue;
                    }
                },
                Some(c) => c,
            };

            if self.chars.peek() != Some(&'-') {
                items.push(ClassItem::Single(lo));
                continue;
            }
            self.chars.next(); // consume '-'

            let hi = match self.chars.next() {
                None => return Err(SyntaxError::UnclosedClass),
                Some(']') => {
                    // Trailing '-' is literal.
                    items.push(ClassItem::Single(lo));
                    items.push(ClassItem::Single('-'));
                    break;
                }
                Some('\\') => match self.parse_escape_char()? {
                    Escape::Char(c) => c,
                    Escape::Perl(class, negated) => {
                        items.push(ClassItem::Single(lo));
                        items.push(ClassItem::Single('-'));
                        items.push(ClassItem::Perl { class, negated });
                        continue;
                    }
                },
                Some(c) => c,
            };
            if lo > hi {
                return Err(SyntaxError::InvalidClassRange(lo, hi));
            }
            items.push(ClassItem::Range(lo, hi));
        }

        if items.is_empty() {
            return Err(SyntaxError::EmptyClass);
        }
        Ok(Node::Literal(CharSet {
            negated,
            kind: CharSetKind::Custom(items),
        }))
    }

    /// Parse an escape outside brackets, including back-references.
    fn parse_escape(&mut self) -> Result<Node, SyntaxError> {
        self.chars.next(); // consume '\'
        if let Some(&c) = self.chars.peek()
            && let Some(digit) = c.to_digit(10)
            && digit != 0
        {
            self.chars.next();
            let index = digit as usize;
            if index > self.group_count {
                return Err(SyntaxError::InvalidBackReference(index));
            }
            return Ok(Node::BackReference(index));
        }
        Ok(match self.parse_escape_char()? {
            Escape::Char(c) => Node::char(c),
            Escape::Perl(class, negated) => Node::Literal(CharSet::perl(class, negated)),
        })
    }

    /// Parse the remainder of an escape (the `\` has already been consumed).
    fn parse_escape_char(&mut self) -> Result<Escape, SyntaxError> {
        let c = self.chars.next().ok_or(SyntaxError::TrailingBackslash)?;
        if let Some(escape) = ESCAPES.get(&c) {
            return Ok(*escape);
        }
        match c {
            'x' => self.parse_hex(2),
            'u' => self.parse_hex(4),
            c if !c.is_alphanumeric() => Ok(Escape::Char(c)),
            c => Err(SyntaxError::UnknownEscape(c)),
        }
    }

    fn parse_hex(&mut self, width: usize) -> Result<Escape, SyntaxError> {
        let digits: String = self.chars.by_ref().take(width).collect();
        if digits.chars().count() != width || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(SyntaxError::InvalidHexEscape);
        }
        u32::from_str_radix(&digits, 16)
            .ok()
            .and_then(char::from_u32)
            .map(Escape::Char)
            .ok_or(SyntaxError::InvalidHexEscape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(s: &str) -> Ast {
        parse(s).expect("parse should succeed")
    }
    fn parse_err(s: &str) -> SyntaxError {
        parse(s).expect_err("parse should fail")
    }

    fn concat_items(ast: Ast) -> Vec<Node> {
        match ast.root {
            Node::Concat(items) => items,
            other => panic!("expected Concat, got {other:?}"),
        }
    }

    // --- Literals ---

    #[test]
    fn test_single_char() {
        assert_eq!(parse_ok("a").root, Node::char('a'));
    }

    #[test]
    fn test_empty_pattern() {
        let ast = parse_ok("");
        assert_eq!(ast.root, Node::Empty);
        assert_eq!(ast.group_count, 0);
    }

    #[test]
    fn test_concat() {
        let items = concat_items(parse_ok("ab"));
        assert_eq!(items, vec![Node::char('a'), Node::char('b')]);
    }

    #[test]
    fn test_escaped_metachar() {
        let items = concat_items(parse_ok(r"\+\.\\"));
        assert_eq!(items, vec![Node::char('+'), Node::char('.'), Node::char('\\')]);
    }

    #[test]
    fn test_close_brackets_are_literal() {
        let items = concat_items(parse_ok("]}"));
        assert_eq!(items, vec![Node::char(']'), Node::char('}')]);
    }

    #[test]
    fn test_control_and_hex_escapes() {
        let items = concat_items(parse_ok(r"\t\x41é"));
        assert_eq!(items, vec![Node::char('\t'), Node::char('A'), Node::char('é')]);
    }

    #[test]
    fn test_dot() {
        match parse_ok(".").root {
            Node::Literal(cs) => assert_eq!(cs.kind, CharSetKind::Any),
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    // --- Classes ---

    #[test]
    fn test_perl_escapes() {
        match parse_ok(r"\D").root {
            Node::Literal(cs) => {
                assert!(cs.negated);
                assert_eq!(cs.kind, CharSetKind::Perl(PerlClass::Digit));
            }
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    #[test]
    fn test_class_range() {
        match parse_ok("[0-9]").root {
            Node::Literal(cs) => {
                assert!(!cs.negated);
                assert_eq!(cs.kind, CharSetKind::Custom(vec![ClassItem::Range('0', '9')]));
            }
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    #[test]
    fn test_negated_class_with_escapes() {
        match parse_ok(r"[^\d_\]]").root {
            Node::Literal(cs) => {
                assert!(cs.negated);
                assert_eq!(
                    cs.kind,
                    CharSetKind::Custom(vec![
                        ClassItem::Perl {
                            class: PerlClass::Digit,
                            negated: false
                        },
                        ClassItem::Single('_'),
                        ClassItem::Single(']'),
                    ])
                );
            }
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    #[test]
    fn test_class_hyphen_edges() {
        match parse_ok("[-a-]").root {
            Node::Literal(cs) => assert_eq!(
                cs.kind,
                CharSetKind::Custom(vec![
                    ClassItem::Single('-'),
                    ClassItem::Single('a'),
                    ClassItem::Single('-'),
                ])
            ),
            other => panic!("expected Literal, got {other:?}"),
        }
    }

    // --- Quantifiers ---

    fn repetition(ast: Ast) -> (u32, Option<u32>, bool) {
        match ast.root {
            Node::Repetition {
                min, max, greedy, ..
            } => (min, max, greedy),
            other => panic!("expected Repetition, got {other:?}"),
        }
    }

    #[test]
    fn test_star_plus_question() {
        assert_eq!(repetition(parse_ok("a*")), (0, None, true));
        assert_eq!(repetition(parse_ok("a+")), (1, None, true));
        assert_eq!(repetition(parse_ok("a?")), (0, Some(1), true));
    }

    #[test]
    fn test_brace_forms() {
        assert_eq!(repetition(parse_ok("a{3}")), (3, Some(3), true));
        assert_eq!(repetition(parse_ok("a{3,}")), (3, None, true));
        assert_eq!(repetition(parse_ok("a{2,5}")), (2, Some(5), true));
    }

    #[test]
    fn test_lazy_suffix() {
        assert_eq!(repetition(parse_ok("a*?")), (0, None, false));
        assert_eq!(repetition(parse_ok("a{1,2}?")), (1, Some(2), false));
    }

    #[test]
    fn test_quantifier_binds_to_last_atom() {
        let items = concat_items(parse_ok(r"\+{5}x"));
        assert!(matches!(
            &items[0],
            Node::Repetition { min: 5, max: Some(5), child, .. } if **child == Node::char('+')
        ));
        assert_eq!(items[1], Node::char('x'));
    }

    // --- Groups and alternation ---

    #[test]
    fn test_alternation() {
        match parse_ok("a|b|").root {
            Node::Alternation(alts) => {
                assert_eq!(alts, vec![Node::char('a'), Node::char('b'), Node::Empty]);
            }
            other => panic!("expected Alternation, got {other:?}"),
        }
    }

    #[test]
    fn test_group_numbering_by_open_paren() {
        let ast = parse_ok("((a)(?:b)(c))");
        assert_eq!(ast.group_count, 3);
        let Node::Group { index, child } = ast.root else {
            panic!("expected outer group");
        };
        assert_eq!(index, Some(1));
        let Node::Concat(items) = *child else {
            panic!("expected Concat");
        };
        assert!(matches!(items[0], Node::Group { index: Some(2), .. }));
        assert!(matches!(items[1], Node::Group { index: None, .. }));
        assert!(matches!(items[2], Node::Group { index: Some(3), .. }));
    }

    #[test]
    fn test_back_reference() {
        let items = concat_items(parse_ok(r"(a)\1"));
        assert_eq!(items[1], Node::BackReference(1));
    }

    #[test]
    fn test_back_reference_inside_own_group() {
        // Group 1 is open (not closed) when \1 is seen; still accepted.
        assert!(parse(r"(a\1)").is_ok());
    }

    #[test]
    fn test_anchors() {
        let items = concat_items(parse_ok("^a$"));
        assert_eq!(items[0], Node::AnchorStart);
        assert_eq!(items[2], Node::AnchorEnd);
    }

    // --- Errors ---

    #[test]
    fn test_unclosed_group() {
        assert_eq!(parse_err("(ab"), SyntaxError::UnclosedGroup);
    }

    #[test]
    fn test_unmatched_paren() {
        assert_eq!(parse_err("ab)"), SyntaxError::UnmatchedParen);
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |n: usize| format!("{}a{}", "(?:".repeat(n), ")".repeat(n));
        assert!(parse(&nested(MAX_NESTING)).is_ok());
        assert_eq!(parse_err(&nested(MAX_NESTING + 1)), SyntaxError::NestingTooDeep);
        assert_eq!(parse_err(&nested(100_000)), SyntaxError::NestingTooDeep);
        // Siblings do not count towards the depth.
        assert!(parse(&"(a)".repeat(MAX_NESTING * 2)).is_ok());
    }

    #[test]
    fn test_unsupported_group() {
        assert_eq!(parse_err("(?=a)"), SyntaxError::UnsupportedGroup);
    }

    #[test]
    fn test_unclosed_class() {
        assert_eq!(parse_err("[abc"), SyntaxError::UnclosedClass);
        assert_eq!(parse_err("[a-"), SyntaxError::UnclosedClass);
    }

    #[test]
    fn test_empty_class() {
        assert_eq!(parse_err("[]"), SyntaxError::EmptyClass);
    }

    #[test]
    fn test_reversed_class_range() {
        assert_eq!(parse_err("[z-a]"), SyntaxError::InvalidClassRange('z', 'a'));
    }

    #[test]
    fn test_invalid_repetition_range() {
        assert_eq!(parse_err("a{5,2}"), SyntaxError::InvalidRepetitionRange(5, 2));
    }

    #[test]
    fn test_malformed_braces() {
        assert_eq!(parse_err("a{"), SyntaxError::InvalidRepetition);
        assert_eq!(parse_err("a{,3}"), SyntaxError::InvalidRepetition);
        assert_eq!(parse_err("a{2x}"), SyntaxError::InvalidRepetition);
        assert_eq!(parse_err("{2}"), SyntaxError::InvalidRepetition);
    }

    #[test]
    fn test_repetition_too_large() {
        assert_eq!(parse_err("a{1001}"), SyntaxError::RepetitionTooLarge);
        assert_eq!(parse_err("a{99999999999}"), SyntaxError::RepetitionTooLarge);
    }

    #[test]
    fn test_nothing_to_repeat() {
        assert_eq!(parse_err("*a"), SyntaxError::NothingToRepeat('*'));
        assert_eq!(parse_err("a|+"), SyntaxError::NothingToRepeat('+'));
        assert_eq!(parse_err("(?a)"), SyntaxError::UnsupportedGroup);
    }

    #[test]
    fn test_nested_and_possessive_quantifiers() {
        assert_eq!(parse_err("a**"), SyntaxError::NestedQuantifier);
        assert_eq!(parse_err("a*?*"), SyntaxError::NestedQuantifier);
        assert_eq!(parse_err("a*+"), SyntaxError::PossessiveQuantifier);
    }

    #[test]
    fn test_escape_errors() {
        assert_eq!(parse_err(r"\q"), SyntaxError::UnknownEscape('q'));
        assert_eq!(parse_err(r"\0"), SyntaxError::UnknownEscape('0'));
        assert_eq!(parse_err("a\\"), SyntaxError::TrailingBackslash);
        assert_eq!(parse_err(r"\xZZ"), SyntaxError::InvalidHexEscape);
        assert_eq!(parse_err(r"\u12"), SyntaxError::InvalidHexEscape);
    }

    #[test]
    fn test_forward_back_reference_rejected() {
        assert_eq!(parse_err(r"\1(a)"), SyntaxError::InvalidBackReference(1));
        assert_eq!(parse_err(r"(a)\2"), SyntaxError::InvalidBackReference(2));
    }
}
