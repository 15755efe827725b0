//! Character class membership tests.

use super::ast::{CharSet, CharSetKind, ClassItem, PerlClass};

/// Test whether `ch` is a member of `cs`.
pub fn charset_matches(cs: &CharSet, ch: char) -> bool {
    let base = kind_matches(&cs.kind, ch);
    if cs.negated { !base } else { base }
}

fn kind_matches(kind: &CharSetKind, ch: char) -> bool {
    match kind {
        CharSetKind::Char(c) => *c == ch,
        CharSetKind::Any => !is_line_terminator(ch),
        CharSetKind::Perl(class) => perl_matches(*class, ch),
        CharSetKind::Custom(items) => items.iter().any(|item| char_in_item(item, ch)),
    }
}

/// Test whether `ch` falls within a single bracket item.
fn char_in_item(item: &ClassItem, ch: char) -> bool {
    match item {
        ClassItem::Single(c) => *c == ch,
        ClassItem::Range(lo, hi) => *lo <= ch && ch <= *hi,
        ClassItem::Perl { class, negated } => perl_matches(*class, ch) != *negated,
    }
}

fn perl_matches(class: PerlClass, ch: char) -> bool {
    match class {
        PerlClass::Digit => ch.is_ascii_digit(),
        PerlClass::Word => ch.is_ascii_alphanumeric() || ch == '_',
        PerlClass::Space => matches!(ch, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'),
    }
}

/// Characters `.` refuses to match.
pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(items: Vec<ClassItem>, negated: bool) -> CharSet {
        CharSet {
            negated,
            kind: CharSetKind::Custom(items),
        }
    }

    #[test]
    fn single_char() {
        assert!(charset_matches(&CharSet::char('x'), 'x'));
        assert!(!charset_matches(&CharSet::char('x'), 'X'));
    }

    #[test]
    fn dot_skips_line_terminators() {
        let dot = CharSet {
            negated: false,
            kind: CharSetKind::Any,
        };
        assert!(charset_matches(&dot, 'a'));
        assert!(charset_matches(&dot, '\t'));
        assert!(!charset_matches(&dot, '\n'));
        assert!(!charset_matches(&dot, '\r'));
        assert!(!charset_matches(&dot, '\u{2028}'));
    }

    #[test]
    fn digit_is_ascii_only() {
        let d = CharSet::perl(PerlClass::Digit, false);
        assert!(charset_matches(&d, '0'));
        assert!(charset_matches(&d, '9'));
        assert!(!charset_matches(&d, 'a'));
        assert!(!charset_matches(&d, '٣'));
    }

    #[test]
    fn negated_word() {
        let w = CharSet::perl(PerlClass::Word, true);
        assert!(charset_matches(&w, '-'));
        assert!(charset_matches(&w, ' '));
        assert!(!charset_matches(&w, '_'));
        assert!(!charset_matches(&w, 'Q'));
    }

    #[test]
    fn space_set() {
        let s = CharSet::perl(PerlClass::Space, false);
        for ch in [' ', '\t', '\n', '\x0B', '\x0C', '\r'] {
            assert!(charset_matches(&s, ch), "expected space: {ch:?}");
        }
        assert!(!charset_matches(&s, 'a'));
    }

    #[test]
    fn custom_range() {
        let cs = custom(vec![ClassItem::Range('a', 'c')], false);
        assert!(charset_matches(&cs, 'a'));
        assert!(charset_matches(&cs, 'b'));
        assert!(charset_matches(&cs, 'c'));
        assert!(!charset_matches(&cs, 'd'));
    }

    #[test]
    fn negated_custom_with_perl_item() {
        let cs = custom(
            vec![
                ClassItem::Perl {
                    class: PerlClass::Digit,
                    negated: false,
                },
                ClassItem::Single('_'),
            ],
            true,
        );
        assert!(!charset_matches(&cs, '4'));
        assert!(!charset_matches(&cs, '_'));
        assert!(charset_matches(&cs, 'z'));
    }

    #[test]
    fn negated_perl_item_inside_brackets() {
        let item = ClassItem::Perl {
            class: PerlClass::Space,
            negated: true,
        };
        assert!(char_in_item(&item, 'a'));
        assert!(!char_in_item(&item, ' '));
    }
}
