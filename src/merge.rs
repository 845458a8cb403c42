//! Merge engine
//!
//! Fills `{{token}}` placeholders and replicates table rows.
//!
//! Pipeline, per paragraph and per bound token:
//!
//! 1. [`token`]: find the first match in the paragraph's flattened text
//! 2. [`runs`]: map the match back to the runs covering it
//! 3. [`render`]: turn the bound [`Value`] into runs or a fragment reference
//! 4. [`splice`]: replace the covering runs, or the whole paragraph for fragments
//! 5. re-flatten and repeat until the token no longer matches
//!
//! [`table`] drives the same pipeline over cloned template rows.
//!
//! Tokens with no binding are left verbatim; merging is best effort by design of the format.
//! Payloads (images, fragments) are registered with the [`PackageStore`] passed to the
//! [`Merger`].

pub mod ast;
pub mod error;
pub mod fragment;
pub mod render;
pub mod runs;
pub mod splice;
pub mod store;
pub mod styles;
pub mod table;
pub mod testing;
pub mod token;
pub mod value;

pub use ast::{Block, Cell, Document, Formatting, FragmentRef, Paragraph, Row, Run, Table};
pub use error::{MergeError, Result};
pub use store::{MemoryStore, PackageStore};
pub use value::{Bindings, ImagePayload, ImageValue, Value};

use render::{Rendered, Renderer};
use token::TokenPattern;
use tracing::{debug, trace, warn};

/// EMU per pixel at 96 DPI
pub const EMU_PER_PIXEL: i64 = 9525;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Upper bound on replacements of one token within one paragraph. With 0, any match of a
    /// bound token fails with [`MergeError::ReplacementLimit`].
    pub max_replacements_per_token: usize,
    /// Length-unit conversion applied to image pixel sizes
    pub emu_per_pixel: i64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            max_replacements_per_token: 1000,
            emu_per_pixel: EMU_PER_PIXEL,
        }
    }
}

/// Bound token, compiled once per merge call
struct CompiledBinding<'b> {
    pattern: TokenPattern,
    value: &'b Value,
}

/// Applies bindings to documents, registering payloads with a store.
///
/// One merger works on one document at a time; the `&mut` borrows enforce it.
pub struct Merger<'s, S: PackageStore> {
    store: &'s mut S,
    options: MergeOptions,
}

impl<'s, S: PackageStore> Merger<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self::with_options(store, MergeOptions::default())
    }

    pub fn with_options(store: &'s mut S, options: MergeOptions) -> Self {
        Self { store, options }
    }

    /// Substitute `bindings` in the body, every header and every footer of `doc`.
    pub fn substitute_tokens(&mut self, doc: &mut Document, bindings: &Bindings) -> Result<()> {
        let compiled = compile(bindings)?;
        self.substitute_compiled(&mut doc.body, &compiled)?;
        for part in doc.headers.iter_mut().chain(doc.footers.iter_mut()) {
            self.substitute_compiled(&mut part.blocks, &compiled)?;
        }

        let leftover = doc.placeholders();
        if !leftover.is_empty() {
            let names: Vec<&str> = leftover.iter().map(|(n, _)| n.as_str()).collect();
            warn!(count = leftover.len(), tokens = ?names, "unresolved tokens left in document");
        }
        Ok(())
    }

    /// Substitute `bindings` in a block list, descending into table cells.
    pub fn substitute_blocks(&mut self, blocks: &mut [Block], bindings: &Bindings) -> Result<()> {
        let compiled = compile(bindings)?;
        self.substitute_compiled(blocks, &compiled)
    }

    fn substitute_compiled(
        &mut self,
        blocks: &mut [Block],
        bindings: &[CompiledBinding<'_>],
    ) -> Result<()> {
        for i in 0..blocks.len() {
            let replacement = match &mut blocks[i] {
                Block::Paragraph(p) => self.substitute_paragraph(p, bindings)?,
                Block::Table(t) => {
                    for cell in t.rows.iter_mut().flat_map(|r| r.cells.iter_mut()) {
                        self.substitute_compiled(&mut cell.blocks, bindings)?;
                    }
                    None
                }
                Block::Fragment(_) => None,
            };
            // A fragment takes the place of the whole paragraph in its parent
            if let Some(fragment) = replacement {
                blocks[i] = Block::Fragment(fragment);
            }
        }
        Ok(())
    }

    /// Run every binding over one paragraph. Returns the fragment that must replace the
    /// paragraph, if a fragment value was hit.
    fn substitute_paragraph(
        &mut self,
        paragraph: &mut Paragraph,
        bindings: &[CompiledBinding<'_>],
    ) -> Result<Option<FragmentRef>> {
        let limit = self.options.max_replacements_per_token;
        for binding in bindings {
            let mut replaced = 0;
            while let Some(found) = binding.pattern.find(&paragraph.inner_text()) {
                trace!(token = binding.pattern.name(), span = ?found.span, "token match");
                if replaced == limit {
                    return Err(MergeError::ReplacementLimit {
                        token: binding.pattern.name().to_string(),
                        limit,
                    });
                }
                replaced += 1;

                let mut renderer = Renderer::new(&mut *self.store, self.options.emu_per_pixel);
                match renderer.render(binding.value, &found)? {
                    Rendered::Runs(runs) => splice::splice(paragraph, &found.span, runs),
                    Rendered::Fragment(fragment) => {
                        debug!(
                            token = binding.pattern.name(),
                            id = %fragment.id,
                            "paragraph replaced by fragment"
                        );
                        return Ok(Some(fragment));
                    }
                }
            }
            if replaced > 0 {
                debug!(
                    token = binding.pattern.name(),
                    kind = binding.value.kind(),
                    count = replaced,
                    "substituted"
                );
            }
        }
        Ok(None)
    }

    /// Append a paragraph styled with the paragraph style named `style_name` in `doc`'s catalog.
    pub fn append_styled_paragraph(
        &mut self,
        doc: &mut Document,
        style_name: &str,
        text: &str,
    ) -> Result<()> {
        let style_id = doc.styles.paragraph_style_id(style_name)?;
        doc.body.push(Block::Paragraph(
            Paragraph::new(vec![Run::text(text)]).with_style(style_id),
        ));
        Ok(())
    }

    /// Register `markup` as a fragment and insert its reference after body block `index`, or
    /// at the end of the body when `index` is past it.
    pub fn append_fragment_after(
        &mut self,
        doc: &mut Document,
        index: usize,
        markup: &str,
    ) -> FragmentRef {
        let fragment =
            Renderer::new(&mut *self.store, self.options.emu_per_pixel).register_fragment(markup);
        let at = index.saturating_add(1).min(doc.body.len());
        doc.body.insert(at, Block::Fragment(fragment.clone()));
        fragment
    }
}

fn compile(bindings: &Bindings) -> Result<Vec<CompiledBinding<'_>>> {
    bindings
        .iter()
        .map(|(name, value)| {
            Ok(CompiledBinding {
                pattern: TokenPattern::new(name)?,
                value,
            })
        })
        .collect()
}
