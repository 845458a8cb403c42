//! Table replicator
//!
//! Grows the first table of a document from a list of records, using an existing row as the
//! formatting template. The template row is cloned for every record and never filled itself.
//!
//! Two modes:
//!
//! - Positional ([`Merger::fill_table`]): records are lists of values, written cell by cell
//!   with the formatting of the template cell's first run.
//! - Composite ([`Merger::fill_composite_table`]): records are [`Bindings`], substituted into
//!   the cloned row's paragraphs through the regular token pipeline.
//!
//! The template is the row flagged `template`; without a flag it is the first row after the
//! optional header. Both modes do nothing when the document has no table.

use super::ast::{Block, Cell, Document, Paragraph, Row, Run, Table};
use super::error::{MergeError, Result};
use super::fragment;
use super::store::PackageStore;
use super::value::{Bindings, Value};
use super::{compile, Merger};
use std::fmt;
use tracing::debug;

impl<'s, S: PackageStore> Merger<'s, S> {
    /// Replace the data rows of the first table with one row per record.
    ///
    /// Every row except the header (when `skip_header`) is detached and kept only as a
    /// template source. Without a header and without a flagged template, the first record
    /// is cloned from the first row and later records from the second row when there is one.
    pub fn fill_table<T: fmt::Display>(
        &mut self,
        doc: &mut Document,
        skip_header: bool,
        records: &[Vec<T>],
    ) {
        match doc.first_table_mut() {
            Some(table) => fill_positional(table, skip_header, records),
            None => debug!("no table to fill"),
        }
    }

    /// Replace the template row of the first table with one substituted copy per record.
    ///
    /// Fragment values lose any nested tables first. Without a template row this is a
    /// no-op; see [`Merger::require_template_row`] for a strict check.
    pub fn fill_composite_table(
        &mut self,
        doc: &mut Document,
        skip_header: bool,
        records: &[Bindings],
    ) -> Result<()> {
        let Some(table) = doc.first_table_mut() else {
            debug!("no table to fill");
            return Ok(());
        };
        let Some(position) = template_position(table, skip_header) else {
            debug!("table has no template row");
            return Ok(());
        };

        let template = table.rows.remove(position);
        for (i, record) in records.iter().enumerate() {
            let bindings = record.map_values(strip_fragment_tables)?;
            let compiled = compile(&bindings)?;

            let mut row = template.clone();
            row.template = false;
            for cell in &mut row.cells {
                self.substitute_compiled(&mut cell.blocks, &compiled)?;
            }
            table.rows.push(row);
            debug!(record = i, bindings = bindings.len(), "composite row appended");
        }
        Ok(())
    }

    /// Fail with [`MergeError::MissingTemplateRow`] unless a composite fill would find a
    /// table with a template row.
    pub fn require_template_row(&self, doc: &Document, skip_header: bool) -> Result<()> {
        doc.first_table()
            .and_then(|t| template_position(t, skip_header))
            .map(|_| ())
            .ok_or(MergeError::MissingTemplateRow)
    }
}

fn template_position(table: &Table, skip_header: bool) -> Option<usize> {
    table.rows.iter().position(|r| r.template).or_else(|| {
        let skip = usize::from(skip_header);
        (skip < table.rows.len()).then_some(skip)
    })
}

fn strip_fragment_tables(value: &Value) -> Result<Value> {
    match value {
        Value::Fragment(markup) => Ok(Value::Fragment(fragment::strip_tables(markup)?)),
        other => Ok(other.clone()),
    }
}

/// Positional fill of a single table.
pub fn fill_positional<T: fmt::Display>(table: &mut Table, skip_header: bool, records: &[Vec<T>]) {
    let keep = usize::from(skip_header).min(table.rows.len());
    let templates: Vec<Row> = table.rows.drain(keep..).collect();
    let flagged = templates.iter().position(|r| r.template);

    for (i, record) in records.iter().enumerate() {
        let template = match flagged {
            Some(position) => templates.get(position),
            None if skip_header || i == 0 || templates.len() < 2 => templates.first(),
            None => templates.get(1),
        };
        let row = match template {
            Some(template) => clone_with_values(template, record),
            None => plain_row(record),
        };
        table.rows.push(row);
    }
    debug!(rows = records.len(), header = keep > 0, "table filled");
}

fn clone_with_values<T: fmt::Display>(template: &Row, values: &[T]) -> Row {
    let mut row = template.clone();
    row.template = false;

    for ((cell, source), value) in row.cells.iter_mut().zip(&template.cells).zip(values) {
        let formatting = source
            .anchor_run()
            .map(|r| r.formatting.clone())
            .unwrap_or_default();
        let mut run = Run::text(value.to_string());
        run.adopt(&formatting);

        let paragraph = cell.blocks.iter_mut().find_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        });
        match paragraph {
            Some(p) => {
                p.runs.clear();
                p.runs.push(run);
            }
            None => cell.blocks.push(Block::Paragraph(Paragraph::new(vec![run]))),
        }
    }
    row
}

fn plain_row<T: fmt::Display>(values: &[T]) -> Row {
    Row::new(
        values
            .iter()
            .map(|v| Cell::new(vec![Block::Paragraph(Paragraph::new(vec![Run::text(v.to_string())]))]))
            .collect(),
    )
}
