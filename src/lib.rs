//! # docfill
//!
//! Fills `{{token}}` placeholders in run-structured documents (paragraphs of styled runs,
//! tables of rows and cells) with text, images or markup fragments, keeping the formatting
//! anchored where each token starts.
//!
//! The engine lives in [`merge`]. It works on an in-memory tree and never touches a package
//! container: binary and markup payloads are handed to a [`merge::store::PackageStore`], which
//! the caller persists.
//!
//! ## Testing
//!
//! Tree builders for tests live in [`merge::testing`].

pub mod merge;

pub use merge::{MergeError, MergeOptions, Merger};
