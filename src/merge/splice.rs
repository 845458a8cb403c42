//! Run splicer
//!
//! Replaces the runs covering a token match with new runs. The first covering run anchors
//! the edit: its text before the token becomes a prefix run, and its formatting is cloned onto
//! every run produced. The last covering run contributes the text after the token as a suffix
//! run.
//!
//! ```text
//!   "Hel" | "lo {{na" | "me}}!"          token at 6..14, covering runs 1..3
//!   "Hel" | "lo " | <content> | "!"      prefix, content and suffix take run 1's formatting
//! ```

use super::ast::{Paragraph, Run};
use super::runs::RunIndex;
use std::ops::Range;

/// Replace the token at `span` with `content`, in place.
///
/// Empty prefix and suffix runs are not emitted. Runs outside the covering range are left
/// untouched and keep their order.
pub fn splice(paragraph: &mut Paragraph, span: &Range<usize>, content: Vec<Run>) {
    let index = RunIndex::build(&paragraph.runs);
    let selected = index.covering(span);
    if selected.is_empty() {
        return;
    }
    let first = index.spans()[selected.start];
    let last = index.spans()[selected.end - 1];

    let anchor = paragraph.runs[first.run].formatting.clone();

    let first_text = paragraph.runs[first.run].inner_text();
    let cut = span.start.saturating_sub(first.start).min(first_text.len());
    let prefix = &first_text[..cut];

    let last_text = paragraph.runs[last.run].inner_text();
    let cut = span.end.saturating_sub(last.start).min(last_text.len());
    let suffix = &last_text[cut..];

    let mut replacement = Vec::with_capacity(content.len() + 2);
    if !prefix.is_empty() {
        replacement.push(Run::text(prefix));
    }
    replacement.extend(content);
    if !suffix.is_empty() {
        replacement.push(Run::text(suffix));
    }
    for run in &mut replacement {
        run.adopt(&anchor);
    }

    paragraph.runs.splice(selected, replacement);
}
