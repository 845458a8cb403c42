//! Property-based tests for run splitting
//!
//! However a paragraph's text is cut into runs, substitution must produce the same flattened
//! text, and paragraphs without tokens must come back untouched.

use docfill::merge::ast::{Block, Paragraph, Run};
use docfill::merge::testing::{body_paragraph, document, styled_run};
use docfill::merge::{Bindings, MemoryStore, Merger};
use proptest::prelude::*;

/// Cut `text` into runs at the given (sorted, deduplicated) byte positions
fn split_into_runs(text: &str, mut cuts: Vec<usize>) -> Vec<Run> {
    cuts.retain(|c| *c > 0 && *c < text.len());
    cuts.sort_unstable();
    cuts.dedup();

    let mut runs = Vec::new();
    let mut start = 0;
    for (i, cut) in cuts.into_iter().chain(std::iter::once(text.len())).enumerate() {
        runs.push(styled_run(&text[start..cut], &format!("r{}", i)));
        start = cut;
    }
    runs
}

fn merge_text(runs: Vec<Run>, bindings: &Bindings) -> (String, Paragraph) {
    let mut doc = document(vec![Block::Paragraph(Paragraph::new(runs))]);
    let mut store = MemoryStore::new();
    Merger::new(&mut store)
        .substitute_tokens(&mut doc, bindings)
        .expect("merge succeeds");
    let p = body_paragraph(&doc, 0).clone();
    (p.inner_text(), p)
}

proptest! {
    #[test]
    fn split_token_is_always_reassembled(cuts in prop::collection::vec(0usize..16, 0..8)) {
        let text = "Hello {{name}}!";
        let bindings = Bindings::new().with("name", "World");
        let (flat, _) = merge_text(split_into_runs(text, cuts), &bindings);
        prop_assert_eq!(flat, "Hello World!");
    }

    #[test]
    fn two_tokens_across_runs(cuts in prop::collection::vec(0usize..30, 0..10)) {
        let text = "{{a}} and {{b:x}} then {{a}}";
        let bindings = Bindings::new().with("a", "1").with("b", "two");
        let (flat, _) = merge_text(split_into_runs(text, cuts), &bindings);
        prop_assert_eq!(flat, "1 and two then 1");
    }

    #[test]
    fn text_without_tokens_is_untouched(
        text in "[a-zA-Z ,.!{}]{0,40}",
        cuts in prop::collection::vec(0usize..40, 0..6),
    ) {
        prop_assume!(!text.contains("{{"));
        let runs = split_into_runs(&text, cuts);
        let bindings = Bindings::new().with("name", "World");
        let (flat, p) = merge_text(runs.clone(), &bindings);
        prop_assert_eq!(flat, text);
        prop_assert_eq!(p.runs, runs);
    }
}
