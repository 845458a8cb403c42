//! Side-channel stores
//!
//! Images and markup fragments do not live in the tree; the tree only holds references to
//! them. Payloads are registered with a [`PackageStore`], which hands back the reference id.
//! The package I/O layer owns the real store and persists every registration on save.
//! [`MemoryStore`] records registrations in memory, for tests and for the CLI.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub trait PackageStore {
    /// Register an image payload, returning the id drawings embed.
    fn add_media(&mut self, content_type: &str, data: Vec<u8>) -> String;

    /// Register a complete markup document, returning a unique id.
    fn add_fragment(&mut self, markup: String) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: String,
    pub content_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentEntry {
    pub id: String,
    pub markup: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    pub media: Vec<MediaEntry>,
    pub fragments: Vec<FragmentEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fragment(&self, id: &str) -> Option<&FragmentEntry> {
        self.fragments.iter().find(|f| f.id == id)
    }

    pub fn media(&self, id: &str) -> Option<&MediaEntry> {
        self.media.iter().find(|m| m.id == id)
    }
}

impl PackageStore for MemoryStore {
    fn add_media(&mut self, content_type: &str, data: Vec<u8>) -> String {
        let id = format!("rIdImg{}", self.media.len() + 1);
        self.media.push(MediaEntry {
            id: id.clone(),
            content_type: content_type.to_string(),
            data,
        });
        id
    }

    fn add_fragment(&mut self, markup: String) -> String {
        let id = format!("chunk{}", Uuid::new_v4().simple());
        self.fragments.push(FragmentEntry {
            id: id.clone(),
            markup,
        });
        id
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
