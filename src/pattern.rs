//! Compiled patterns and the scanning entry points built on the executor.

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use crate::compiler::{compile, compile_anchored};
use crate::error::Error;
use crate::executor::{Cache, ExecLimits, Outcome, execute_with};
use crate::match_result::MatchResult;
use crate::program::Program;
use crate::syntax::parse;

/// A compiled regular expression.
///
/// Holds two programs built from the same AST: an unanchored one used by
/// [`match_at`](Self::match_at) and [`find_all`](Self::find_all), and one
/// wrapped in start/end anchors used by the whole-subject entry points.
/// Both are immutable, so a `Pattern` can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    program: Program,
    anchored: Program,
    limits: ExecLimits,
}

impl Pattern {
    /// Parse and compile `pattern`.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let ast = parse(pattern)?;
        let program = compile(&ast)?;
        let anchored = compile_anchored(&ast)?;
        Ok(Self {
            source: pattern.to_string(),
            program,
            anchored,
            limits: ExecLimits::default(),
        })
    }

    /// Replace the runtime limits applied to every match attempt.
    pub fn with_limits(mut self, limits: ExecLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> ExecLimits {
        self.limits
    }

    /// The pattern text this was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of capturing groups, excluding group 0.
    pub fn group_count(&self) -> usize {
        self.program.group_count
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn anchored_program(&self) -> &Program {
        &self.anchored
    }

    /// True if the whole of `subject` matches, as if the pattern were
    /// written `^(?:pattern)$`.
    pub fn matches_full(&self, subject: &str) -> bool {
        self.full_match(subject).is_some()
    }

    /// Match the whole of `subject`, returning the groups on success.
    pub fn full_match<'s>(&self, subject: &'s str) -> Option<MatchResult<'s>> {
        let mut cache = Cache::new(&self.anchored, subject);
        self.run(&self.anchored, subject, 0, &mut cache)
    }

    /// One unanchored attempt beginning exactly at byte `offset`.
    pub fn match_at<'s>(&self, subject: &'s str, offset: usize) -> Option<MatchResult<'s>> {
        let mut cache = Cache::new(&self.program, subject);
        self.run(&self.program, subject, offset, &mut cache)
    }

    /// The leftmost match anywhere in `subject`.
    pub fn find<'s>(&self, subject: &'s str) -> Option<MatchResult<'s>> {
        self.find_all(subject).next()
    }

    /// Iterate over all non-overlapping matches, left to right.
    ///
    /// Each call starts a fresh scan from the beginning of `subject`.
    pub fn find_all<'p, 's>(&'p self, subject: &'s str) -> Matches<'p, 's> {
        Matches {
            pattern: self,
            subject,
            offset: 0,
            cache: Cache::new(&self.program, subject),
        }
    }

    fn run<'s>(
        &self,
        program: &Program,
        subject: &'s str,
        offset: usize,
        cache: &mut Cache,
    ) -> Option<MatchResult<'s>> {
        match execute_with(program, subject, offset, self.limits, cache) {
            Outcome::Matched(slots) => Some(MatchResult::new(subject, slots, self.group_count())),
            Outcome::NoMatch => None,
            Outcome::StepLimitExceeded => {
                log::warn!(
                    "pattern {:?}: step limit {:?} exceeded at offset {offset}, attempt rejected",
                    self.source,
                    self.limits.max_steps(),
                );
                None
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Compile `pattern` and test it against the whole of `subject`.
///
/// Convenient for one-off checks; reuse a [`Pattern`] when matching many
/// subjects.
pub fn matches(pattern: &str, subject: &str) -> Result<bool, Error> {
    Ok(Pattern::new(pattern)?.matches_full(subject))
}

/// Iterator returned by [`Pattern::find_all`].
#[derive(Debug)]
pub struct Matches<'p, 's> {
    pattern: &'p Pattern,
    subject: &'s str,
    /// Next byte offset to attempt. Past the end once the scan is over.
    offset: usize,
    cache: Cache,
}

impl<'s> Matches<'_, 's> {
    /// Offset of the character after `offset`, or one past the end.
    fn step_past(&self, offset: usize) -> usize {
        offset
            + self.subject[offset..]
                .chars()
                .next()
                .map_or(1, char::len_utf8)
    }
}

impl<'s> Iterator for Matches<'_, 's> {
    type Item = MatchResult<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.offset <= self.subject.len() {
            let offset = self.offset;
            let pattern = self.pattern;
            match pattern.run(&pattern.program, self.subject, offset, &mut self.cache) {
                Some(m) => {
                    let end = m.range().end;
                    // An empty match must not be retried at the same spot.
                    self.offset = if end > offset {
                        end
                    } else {
                        self.step_past(offset)
                    };
                    log::trace!("match {:?} at {:?}", m.as_str(), m.range());
                    return Some(m);
                }
                None => self.offset = self.step_past(offset),
            }
        }
        None
    }
}

impl FusedIterator for Matches<'_, '_> {}
