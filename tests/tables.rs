//! Integration tests for table replication
//!
//! Positional fills write stringified values cell by cell; composite fills run the token
//! pipeline over a cloned template row per record. Both leave table-less documents alone.

use docfill::merge::ast::{Block, Document, Table};
use docfill::merge::testing::{body_paragraph, document, first_table, paragraph, row, row_texts};
use docfill::merge::{Bindings, MemoryStore, MergeError, Merger, Value};
use rstest::rstest;

fn invoice_table() -> Document {
    document(vec![
        Block::Paragraph(paragraph(&["Invoice"])),
        Block::Table(Table::new(vec![
            row(&["Item", "Qty"], "header"),
            row(&["{{item}}", "{{qty}}"], "data"),
        ])),
    ])
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(5)]
fn test_positional_fill_row_count(#[case] n: usize) {
    let mut doc = invoice_table();
    let records: Vec<Vec<String>> = (0..n).map(|i| vec![format!("item {}", i), i.to_string()]).collect();

    let mut store = MemoryStore::new();
    Merger::new(&mut store).fill_table(&mut doc, true, &records);

    let table = first_table(&doc);
    assert_eq!(table.rows.len(), 1 + n);
    assert_eq!(row_texts(&table.rows[0]), vec!["Item", "Qty"]);
    for (i, generated) in table.rows[1..].iter().enumerate() {
        assert_eq!(row_texts(generated), vec![format!("item {}", i), i.to_string()]);
        for cell in &generated.cells {
            let run = cell.anchor_run().expect("cell run");
            assert_eq!(run.formatting.get("style"), Some("data"));
        }
    }
}

#[test]
fn test_positional_fill_stringifies_values() {
    let mut doc = invoice_table();
    let mut store = MemoryStore::new();
    Merger::new(&mut store).fill_table(&mut doc, true, &[vec![1.5, 2.0]]);

    assert_eq!(row_texts(&first_table(&doc).rows[1]), vec!["1.5", "2"]);
}

#[test]
fn test_composite_fill() {
    let mut doc = invoice_table();
    let records = vec![
        Bindings::new().with("item", "Widget").with("qty", "3"),
        Bindings::new().with("item", "Gadget"),
    ];

    let mut store = MemoryStore::new();
    Merger::new(&mut store)
        .fill_composite_table(&mut doc, true, &records)
        .unwrap();

    let table = first_table(&doc);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(row_texts(&table.rows[1]), vec!["Widget", "3"]);
    // Unbound tokens stay verbatim in their row
    assert_eq!(row_texts(&table.rows[2]), vec!["Gadget", "{{qty}}"]);
    assert_eq!(
        table.rows[1].cells[0]
            .anchor_run()
            .and_then(|r| r.formatting.get("style")),
        Some("data")
    );
}

#[test]
fn test_composite_fill_strips_tables_from_fragments() {
    let mut doc = invoice_table();
    let records = vec![Bindings::new()
        .with(
            "item",
            Value::fragment("<p>Details</p><table><tr><td><table></table></td></tr></table>"),
        )
        .with("qty", "1")];

    let mut store = MemoryStore::new();
    Merger::new(&mut store)
        .fill_composite_table(&mut doc, true, &records)
        .unwrap();

    let table = first_table(&doc);
    let Block::Fragment(fragment) = &table.rows[1].cells[0].blocks[0] else {
        panic!("Expected fragment in cell");
    };
    let markup = &store.fragment(&fragment.id).expect("registered").markup;
    assert_eq!(markup.matches("<table").count(), 0);
    assert!(markup.contains("<p>Details</p>"));
}

#[test]
fn test_composite_fill_uses_flagged_template() {
    let mut doc = document(vec![Block::Table(Table::new(vec![
        row(&["Name"], "header"),
        row(&["notes"], "notes"),
        row(&["{{name}}"], "flagged").as_template(),
    ]))]);
    let records = vec![Bindings::new().with("name", "A")];

    let mut store = MemoryStore::new();
    Merger::new(&mut store)
        .fill_composite_table(&mut doc, true, &records)
        .unwrap();

    let rows: Vec<_> = first_table(&doc).rows.iter().map(row_texts).collect();
    assert_eq!(rows, vec![vec!["Name"], vec!["notes"], vec!["A"]]);
}

#[test]
fn test_fills_without_table_are_noops() {
    let original = document(vec![Block::Paragraph(paragraph(&["{{x}}"]))]);
    let mut doc = original.clone();
    let mut store = MemoryStore::new();
    let mut merger = Merger::new(&mut store);

    merger.fill_table(&mut doc, true, &[vec!["a"]]);
    merger
        .fill_composite_table(&mut doc, true, &[Bindings::new().with("x", "y")])
        .unwrap();

    assert_eq!(doc, original);
    assert_eq!(body_paragraph(&doc, 0).inner_text(), "{{x}}");
}

#[test]
fn test_missing_template_row() {
    let mut doc = document(vec![Block::Table(Table::new(vec![row(&["Header"], "h")]))]);
    let original = doc.clone();
    let mut store = MemoryStore::new();
    let mut merger = Merger::new(&mut store);

    assert!(matches!(
        merger.require_template_row(&doc, true),
        Err(MergeError::MissingTemplateRow)
    ));
    merger
        .fill_composite_table(&mut doc, true, &[Bindings::new()])
        .unwrap();
    assert_eq!(doc, original);

    assert!(merger.require_template_row(&invoice_table(), true).is_ok());
}
