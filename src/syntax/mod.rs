//! Regular expression syntax.
//!
//! # Pattern syntax
//!
//! | Token          | Meaning                                         |
//! |----------------|-------------------------------------------------|
//! | `x`            | The literal character `x`                       |
//! | `\x`           | `x` literally, for any non-alphanumeric `x`     |
//! | `.`            | Any character except a line terminator          |
//! | `[abc]`        | One of `a`, `b`, `c`                            |
//! | `[a-z]`        | One character in the range                      |
//! | `[^...]`       | One character not in the class                  |
//! | `\d` / `\D`    | ASCII digit / non-digit                         |
//! | `\w` / `\W`    | Word character `[A-Za-z0-9_]` / non-word        |
//! | `\s` / `\S`    | Whitespace `[ \t\n\x0B\f\r]` / non-whitespace   |
//! | `\t \n \r \f \a \e` | Control characters                         |
//! | `\xhh`, `\uhhhh` | Character by hexadecimal code                 |
//! | `X*` `X+` `X?` | Zero or more / one or more / optional           |
//! | `X{m}` `X{m,}` `X{m,n}` | Counted repetition                     |
//! | `X*?` etc.     | Lazy form of any quantifier                     |
//! | `(X)`          | Capturing group, numbered by its `(`            |
//! | `(?:X)`        | Non-capturing group                             |
//! | `X\|Y`         | Alternation                                     |
//! | `\1` .. `\9`   | Back-reference to an earlier group              |
//! | `^` `$`        | Start / end of subject                          |

pub mod ast;
pub mod char_class;
pub mod parser;

pub use ast::Ast;
pub use parser::{MAX_NESTING, MAX_REPETITION, SyntaxError, parse};
