use std::borrow::Cow;
use std::ops::Range;

/// Text matched by a [`CompiledPattern`] and its captured groups.
///
/// Group zero is the entire match. Groups that did not participate in the match are `None`.
///
/// [`CompiledPattern`]: crate::CompiledPattern
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchedText<'t> {
    text: Cow<'t, str>,
    ranges: Vec<Option<Range<usize>>>,
}

impl<'t> MatchedText<'t> {
    pub(crate) fn from_standard(text: &'t str, captures: &regex::Captures<'t>) -> Self {
        MatchedText {
            text: text.into(),
            ranges: captures
                .iter()
                .map(|capture| capture.map(|capture| capture.range()))
                .collect(),
        }
    }

    pub(crate) fn from_extended(text: &'t str, captures: &fancy_regex::Captures<'t>) -> Self {
        MatchedText {
            text: text.into(),
            ranges: captures
                .iter()
                .map(|capture| capture.map(|capture| capture.start()..capture.end()))
                .collect(),
        }
    }

    pub fn into_owned(self) -> MatchedText<'static> {
        let MatchedText { text, ranges } = self;
        MatchedText {
            text: text.into_owned().into(),
            ranges,
        }
    }

    /// Gets the entire match.
    pub fn matched(&self) -> &str {
        self.get(0).unwrap_or("")
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.ranges
            .get(index)
            .and_then(Option::as_ref)
            .and_then(|range| self.text.get(range.clone()))
    }

    /// Gets the number of groups, including the entire match.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterates over the captured groups, excluding the entire match.
    pub fn groups(&self) -> impl '_ + Iterator<Item = Option<&str>> {
        (1..self.ranges.len()).map(move |index| self.get(index))
    }
}
