//! Tree builders and accessors for tests
//!
//! Keeps test setup terse: a paragraph is a list of run texts, a styled run carries a single
//! `style` formatting entry that is easy to assert on.

use super::ast::{Block, Cell, Document, Formatting, Paragraph, Row, Run, Table};

/// Paragraph with one default-formatted run per text
pub fn paragraph(texts: &[&str]) -> Paragraph {
    Paragraph::new(texts.iter().map(|t| Run::text(*t)).collect())
}

/// Run whose formatting is `{"style": style}`
pub fn styled_run(text: &str, style: &str) -> Run {
    Run::text(text).with_formatting(Formatting::new().with("style", style))
}

pub fn document(body: Vec<Block>) -> Document {
    Document::new(body)
}

/// Row with one single-paragraph, single-run cell per text, each styled `style`
pub fn row(texts: &[&str], style: &str) -> Row {
    Row::new(
        texts
            .iter()
            .map(|t| {
                Cell::new(vec![Block::Paragraph(Paragraph::new(vec![styled_run(
                    t, style,
                )]))])
            })
            .collect(),
    )
}

/// Texts of the paragraph's runs, in order
pub fn run_texts(paragraph: &Paragraph) -> Vec<String> {
    paragraph.runs.iter().map(Run::inner_text).collect()
}

/// The `index`th body block, which must be a paragraph
pub fn body_paragraph(doc: &Document, index: usize) -> &Paragraph {
    match &doc.body[index] {
        Block::Paragraph(p) => p,
        other => panic!("Expected paragraph at body[{}], got {:?}", index, other),
    }
}

/// The first body table
pub fn first_table(doc: &Document) -> &Table {
    doc.first_table().expect("document has a table")
}

/// Flattened text of every cell of `row`
pub fn row_texts(row: &Row) -> Vec<String> {
    row.cells
        .iter()
        .map(|c| c.paragraphs().map(Paragraph::inner_text).collect())
        .collect()
}
