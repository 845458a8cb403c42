//! Document tree
//!
//! The tree the merge engine works on. Ownership is strictly top-down: a document owns its
//! blocks, a table its rows, a row its cells, a cell its blocks, a paragraph its runs. There
//! are no back references; operations that need to replace a node in its parent receive the
//! parent's block list and the node index explicitly.
//!
//! Structure:
//!
//! | Node      | Children                    |
//! |-----------|-----------------------------|
//! | Document  | body blocks, headers, footers, style catalog |
//! | Block     | Paragraph, Table or Fragment reference |
//! | Table     | Rows                        |
//! | Row       | Cells                       |
//! | Cell      | Blocks                      |
//! | Paragraph | Runs                        |
//! | Run       | Text, Break, Drawing        |
//!
//! The tree serializes to JSON through serde, which is how the CLI exchanges it.

use super::styles::StyleCatalog;
use super::token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque bag of run formatting attributes.
///
/// The engine never interprets the entries, it only clones the whole bag from the run that
/// anchors a token onto the runs it produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Formatting(BTreeMap<String, String>);

impl Formatting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A text node inside a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    /// Leading and trailing whitespace is significant
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub preserve_space: bool,
}

/// Inline drawing referencing a registered media payload.
///
/// Extents are in EMU (English Metric Units).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drawing {
    /// Reference id returned by the media store
    pub embed: String,
    /// Unique name of the drawing object
    pub name: String,
    pub cx: i64,
    pub cy: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunContent {
    Text(TextNode),
    Break,
    Drawing(Drawing),
}

/// Minimal unit of uniformly formatted content within a paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    #[serde(default, skip_serializing_if = "Formatting::is_empty")]
    pub formatting: Formatting,
    #[serde(default)]
    pub content: Vec<RunContent>,
}

impl Run {
    pub fn new(content: Vec<RunContent>) -> Self {
        Self {
            formatting: Formatting::default(),
            content,
        }
    }

    /// A run holding a single text node
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![RunContent::Text(TextNode {
            text: text.into(),
            preserve_space: false,
        })])
    }

    pub fn with_formatting(mut self, formatting: Formatting) -> Self {
        self.formatting = formatting;
        self
    }

    /// Concatenated text of the run's text nodes; breaks and drawings contribute nothing.
    pub fn inner_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|node| match node {
                RunContent::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Clone `formatting` onto this run and mark every text node as whitespace preserving.
    pub fn adopt(&mut self, formatting: &Formatting) {
        self.formatting = formatting.clone();
        for node in &mut self.content {
            if let RunContent::Text(t) = node {
                t.preserve_space = true;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_id: Option<String>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            style_id: None,
            runs,
        }
    }

    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }

    /// The paragraph's runs flattened into a single string, in run order
    pub fn inner_text(&self) -> String {
        self.runs.iter().map(Run::inner_text).collect()
    }
}

/// Reference to a registered markup fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    Fragment(FragmentRef),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Cell {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// First run of the cell in document order, the formatting anchor for positional fills
    pub fn anchor_run(&self) -> Option<&Run> {
        self.paragraphs().flat_map(|p| p.runs.iter()).next()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub cells: Vec<Cell>,
    /// Marks the row as the formatting source cloned by table fills
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub template: bool,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            template: false,
        }
    }

    pub fn as_template(mut self) -> Self {
        self.template = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

/// A header or footer part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub body: Vec<Block>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Part>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub footers: Vec<Part>,
    #[serde(default)]
    pub styles: StyleCatalog,
}

impl Document {
    pub fn new(body: Vec<Block>) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    /// First table of the body, if any.
    ///
    /// Tables only nest inside cells, so the first top-level table is also the first table
    /// in document order.
    pub fn first_table(&self) -> Option<&Table> {
        self.body.iter().find_map(|block| match block {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn first_table_mut(&mut self) -> Option<&mut Table> {
        self.body.iter_mut().find_map(|block| match block {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Every placeholder still present in the document (body, headers, footers), in document
    /// order, as `(name, modifier)` pairs.
    pub fn placeholders(&self) -> Vec<(String, Option<String>)> {
        let mut found = Vec::new();
        let parts = std::iter::once(&self.body)
            .chain(self.headers.iter().map(|p| &p.blocks))
            .chain(self.footers.iter().map(|p| &p.blocks));
        for blocks in parts {
            collect_placeholders(blocks, &mut found);
        }
        found
    }
}

fn collect_placeholders(blocks: &[Block], found: &mut Vec<(String, Option<String>)>) {
    for block in blocks {
        match block {
            Block::Paragraph(p) => found.extend(token::placeholders(&p.inner_text())),
            Block::Table(t) => {
                for cell in t.rows.iter().flat_map(|r| r.cells.iter()) {
                    collect_placeholders(&cell.blocks, found);
                }
            }
            Block::Fragment(_) => {}
        }
    }
}
