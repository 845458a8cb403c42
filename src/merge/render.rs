//! Value renderer
//!
//! Turns a binding [`Value`] into document content: runs for text and images, a fragment
//! reference for markup. Image and markup payloads are registered with the store here.

use super::ast::{Drawing, FragmentRef, Run, RunContent};
use super::error::Result;
use super::fragment;
use super::store::PackageStore;
use super::token::TokenMatch;
use super::value::{ImageValue, Value};
use tracing::debug;
use uuid::Uuid;

/// Rendered content for one token occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Inline runs, spliced in place of the token
    Runs(Vec<Run>),
    /// Replaces the whole enclosing paragraph
    Fragment(FragmentRef),
}

pub struct Renderer<'a, S: PackageStore> {
    store: &'a mut S,
    emu_per_pixel: i64,
}

impl<'a, S: PackageStore> Renderer<'a, S> {
    pub fn new(store: &'a mut S, emu_per_pixel: i64) -> Self {
        Self {
            store,
            emu_per_pixel,
        }
    }

    pub fn render(&mut self, value: &Value, token: &TokenMatch) -> Result<Rendered> {
        match value {
            Value::Text(text) => Ok(Rendered::Runs(vec![Run::text(text.as_str())])),
            Value::Image(image) => self.render_image(image, token).map(|run| Rendered::Runs(vec![run])),
            Value::Fragment(markup) => Ok(Rendered::Fragment(self.register_fragment(markup))),
        }
    }

    /// Register `markup` wrapped in the document shell.
    pub fn register_fragment(&mut self, markup: &str) -> FragmentRef {
        let id = self.store.add_fragment(fragment::wrap_in_shell(markup));
        debug!(id = %id, bytes = markup.len(), "registered fragment");
        FragmentRef { id }
    }

    fn render_image(&mut self, image: &ImageValue, token: &TokenMatch) -> Result<Run> {
        let (width, height) = image.resized(token.width().or(image.explicit_width));
        let data = image.payload.read_all()?;
        let embed = self.store.add_media(&image.content_type, data);
        debug!(embed = %embed, width, height, "registered image");

        Ok(Run::new(vec![RunContent::Drawing(Drawing {
            embed,
            name: Uuid::new_v4().to_string(),
            cx: self.emu_per_pixel.saturating_mul(i64::from(width)),
            cy: self.emu_per_pixel.saturating_mul(i64::from(height)),
        })]))
    }
}
