//! Style catalog and style cache
//!
//! Paragraphs reference styles by id, while callers think in style names. Each
//! [`StyleCatalog`] memoizes its own name → id lookups, so a cached id
//! always belongs to the catalog (and document) it was resolved against. Adding a style drops
//! the memoized entries.

use super::ast::Formatting;
use super::error::{MergeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleKind {
    Paragraph,
    Character,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub id: String,
    pub name: String,
    pub kind: StyleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on: Option<String>,
    #[serde(default, skip_serializing_if = "Formatting::is_empty")]
    pub run_formatting: Formatting,
}

/// Knobs for [`StyleCatalog::add_paragraph_style`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleProperties {
    pub bold: bool,
    /// Size in half-points
    pub font_size: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleCatalog {
    styles: Vec<Style>,
    #[serde(skip)]
    cache: StyleCache,
}

impl StyleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, style: Style) {
        self.styles.push(style);
        self.cache.clear();
    }

    /// Add a custom paragraph style based on "Normal".
    pub fn add_paragraph_style(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        properties: StyleProperties,
    ) {
        let mut run_formatting = Formatting::new();
        if properties.bold {
            run_formatting = run_formatting.with("bold", "true");
        }
        run_formatting = run_formatting.with("size", properties.font_size.to_string());

        self.add(Style {
            id: id.into(),
            name: name.into(),
            kind: StyleKind::Paragraph,
            based_on: Some("Normal".to_string()),
            run_formatting,
        });
    }

    /// First style carrying `name`, of any kind
    pub fn by_name(&self, name: &str) -> Option<&Style> {
        self.styles.iter().find(|s| s.name == name)
    }

    /// Id of the first paragraph style named `name`, memoized.
    ///
    /// Character styles never match: a paragraph can only reference a paragraph style.
    pub fn paragraph_style_id(&mut self, name: &str) -> Result<String> {
        self.cache.resolve(&self.styles, name)
    }
}

/// Catalogs compare by their styles; the cache is derived state.
impl PartialEq for StyleCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.styles == other.styles
    }
}

impl Eq for StyleCatalog {}

/// Memoized style name → paragraph style id lookups for one catalog
#[derive(Debug, Clone, Default)]
struct StyleCache {
    ids: HashMap<String, String>,
}

impl StyleCache {
    fn resolve(&mut self, styles: &[Style], name: &str) -> Result<String> {
        if let Some(id) = self.ids.get(name) {
            return Ok(id.clone());
        }
        let id = styles
            .iter()
            .find(|s| s.kind == StyleKind::Paragraph && s.name == name)
            .map(|s| s.id.clone())
            .ok_or_else(|| MergeError::StyleNotFound(name.to_string()))?;
        self.ids.insert(name.to_string(), id.clone());
        Ok(id)
    }

    fn clear(&mut self) {
        self.ids.clear();
    }
}
