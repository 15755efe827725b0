use std::ops::Range;

/// The result of a successful match: the whole-match span plus the span of
/// every capturing group that participated.
///
/// Group 0 is the whole match and is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult<'s> {
    subject: &'s str,
    /// `2 * g` and `2 * g + 1` are the start and end of group `g`.
    slots: Vec<Option<usize>>,
}

impl<'s> MatchResult<'s> {
    /// Build a result from executor slots. Slots beyond the group slots
    /// (progress registers) are dropped.
    pub(crate) fn new(subject: &'s str, mut slots: Vec<Option<usize>>, group_count: usize) -> Self {
        slots.truncate(2 * (group_count + 1));
        Self { subject, slots }
    }

    /// Number of capturing groups in the pattern, excluding group 0.
    pub fn group_count(&self) -> usize {
        self.slots.len() / 2 - 1
    }

    /// Byte range matched by group `index`, if it participated.
    pub fn span(&self, index: usize) -> Option<Range<usize>> {
        match (self.slots.get(2 * index)?, self.slots.get(2 * index + 1)?) {
            (Some(start), Some(end)) if start <= end => Some(*start..*end),
            _ => None,
        }
    }

    /// Text matched by group `index`.
    pub fn group(&self, index: usize) -> Option<&'s str> {
        self.span(index).map(|range| &self.subject[range])
    }

    pub fn start(&self, index: usize) -> Option<usize> {
        self.span(index).map(|range| range.start)
    }

    pub fn end(&self, index: usize) -> Option<usize> {
        self.span(index).map(|range| range.end)
    }

    /// Text of the whole match.
    pub fn as_str(&self) -> &'s str {
        self.group(0).unwrap_or_default()
    }

    /// Whole-match byte range.
    pub fn range(&self) -> Range<usize> {
        self.span(0).unwrap_or(0..0)
    }

    pub fn is_empty(&self) -> bool {
        self.range().is_empty()
    }

    /// Every group's text in index order, starting with group 0.
    pub fn iter(&self) -> impl Iterator<Item = Option<&'s str>> + '_ {
        (0..=self.group_count()).map(move |index| self.group(index))
    }
}
