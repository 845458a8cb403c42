//! Run index
//!
//! Maps offsets in a paragraph's flattened text back to the runs they came from. The index is
//! a list of `(run, start, end)` triples, ordered, gap-free and non-overlapping: each run's
//! `start` is the previous run's `end`. It is built from the current run sequence and thrown
//! away after use.

use super::ast::Run;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSpan {
    /// Position of the run in the paragraph
    pub run: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIndex {
    spans: Vec<RunSpan>,
}

impl RunIndex {
    pub fn build(runs: &[Run]) -> Self {
        let mut offset = 0;
        let spans = runs
            .iter()
            .enumerate()
            .map(|(run, r)| {
                let start = offset;
                offset += r.inner_text().len();
                RunSpan {
                    run,
                    start,
                    end: offset,
                }
            })
            .collect();
        Self { spans }
    }

    pub fn spans(&self) -> &[RunSpan] {
        &self.spans
    }

    /// Runs covering the match `span`, as a contiguous range of run positions.
    ///
    /// A run is selected when it starts inside the span, or ends inside it:
    /// `(start >= s && start < e) || (end > s && end <= e)`. Runs that merely touch a
    /// boundary are not selected. When nothing qualifies the match sits strictly inside a
    /// single run, and that run is returned.
    pub fn covering(&self, span: &Range<usize>) -> Range<usize> {
        let (s, e) = (span.start, span.end);
        let mut selected = self
            .spans
            .iter()
            .filter(|r| (r.start >= s && r.start < e) || (r.end > s && r.end <= e))
            .map(|r| r.run);

        match selected.next() {
            Some(first) => {
                let last = selected.last().unwrap_or(first);
                first..last + 1
            }
            None => self
                .spans
                .iter()
                .find(|r| r.start <= s && r.end >= e)
                .map(|r| r.run..r.run + 1)
                .unwrap_or(0..0),
        }
    }
}
