//! Execution engine bits.

use crate::api::Match;

/// A trait for finding the next match in a pattern.
pub trait MatchProducer: std::fmt::Debug {
    /// Attempt to match at or after the given code-unit offset.
    /// \return the Match, storing the position to start looking for the
    /// next match in \p next_start.
    fn next_match(&mut self, start: usize, next_start: &mut Option<usize>) -> Option<Match>;
}

/// A struct which enables iteration over matches.
#[derive(Debug)]
pub struct Matches<Producer: MatchProducer> {
    mp: Producer,
    offset: Option<usize>,
}

impl<Producer: MatchProducer> Matches<Producer> {
    pub(crate) fn new(mp: Producer, start: usize) -> Self {
        Matches {
            mp,
            offset: Some(start),
        }
    }
}

impl<Producer: MatchProducer> Iterator for Matches<Producer> {
    type Item = Match;
    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset?;
        self.mp.next_match(start, &mut self.offset)
    }
}
