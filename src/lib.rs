//! A backtracking regular expression engine with capture groups and
//! back-references.
//!
//! Patterns are parsed into an AST, compiled into a small instruction
//! program and run by a depth-first executor. Back-references make the
//! language non-regular, so matching is exponential in the worst case; use
//! [`ExecLimits`] to bound individual attempts.
//!
//! # Example
//!
//! ```rust
//! use brex::Pattern;
//!
//! let p = Pattern::new(r"CSC([0-9]{3})H1([FS])").unwrap();
//!
//! // Whole-subject matching is anchored at both ends.
//! let m = p.full_match("CSC207H1S").unwrap();
//! assert_eq!(m.group(1), Some("207"));
//! assert_eq!(m.group(2), Some("S"));
//! assert!(!p.matches_full("xCSC207H1S"));
//!
//! // Back-references repeat captured text.
//! let twice = Pattern::new(r"(\d\d\d)ABC\1").unwrap();
//! assert!(twice.matches_full("123ABC123"));
//! assert!(!twice.matches_full("123ABC456"));
//!
//! // Scanning finds every non-overlapping match.
//! let runs = Pattern::new(r"\d+").unwrap();
//! let found: Vec<_> = runs.find_all("a1b22c333").map(|m| m.as_str()).collect();
//! assert_eq!(found, ["1", "22", "333"]);
//! ```

pub mod compiler;
pub mod demo;
mod error;
pub mod executor;
mod match_result;
mod pattern;
pub mod program;
pub mod syntax;

pub use compiler::CompileError;
pub use error::Error;
pub use executor::ExecLimits;
pub use match_result::MatchResult;
pub use pattern::{Matches, Pattern, matches};
pub use program::{Inst, Program};
pub use syntax::SyntaxError;
