//! Binding values
//!
//! A [`Value`] is what a token is replaced with. The variants form a closed set: adding a new
//! substitution kind means adding a variant and handling it in the renderer's `match`.
//!
//! Untyped JSON bindings are converted with [`Value::from_json`]:
//!
//! | JSON                                   | Value            |
//! |----------------------------------------|------------------|
//! | `"text"`                               | `Text`           |
//! | `null`                                 | `Text("")`       |
//! | `{"image": {"path"|"base64", "width", "height", ...}}` | `Image` |
//! | `{"fragment": "<p>markup</p>"}`        | `Fragment`       |
//!
//! Anything else is an [`MergeError::UnsupportedValueKind`].

use super::error::{MergeError, Result};
use base64::Engine;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Where an image's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Bytes(Vec<u8>),
    /// Opened and read only while the image is rendered
    File(PathBuf),
}

impl ImagePayload {
    /// Read the whole payload. File handles are closed when this returns, on success or not.
    pub fn read_all(&self) -> Result<Vec<u8>> {
        match self {
            ImagePayload::Bytes(bytes) => Ok(bytes.clone()),
            ImagePayload::File(path) => {
                let mut file = File::open(path)?;
                let mut bytes = Vec::new();
                file.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageValue {
    pub payload: ImagePayload,
    /// Intrinsic width in pixels
    pub width: u32,
    /// Intrinsic height in pixels
    pub height: u32,
    /// Target width in pixels; a numeric `:<width>` token modifier takes precedence
    pub explicit_width: Option<u32>,
    pub content_type: String,
}

impl ImageValue {
    pub fn new(payload: ImagePayload, width: u32, height: u32) -> Self {
        Self {
            payload,
            width,
            height,
            explicit_width: None,
            content_type: DEFAULT_IMAGE_CONTENT_TYPE.to_string(),
        }
    }

    pub fn with_explicit_width(mut self, width: u32) -> Self {
        self.explicit_width = Some(width);
        self
    }

    /// Pixel size after resizing to `target_width`, keeping the aspect ratio. Heights that do
    /// not fit a `u32` saturate.
    pub fn resized(&self, target_width: Option<u32>) -> (u32, u32) {
        match target_width {
            Some(w) if w > 0 && self.width > 0 => {
                let h = (u64::from(self.height) * u64::from(w) + u64::from(self.width) / 2)
                    / u64::from(self.width);
                (w, u32::try_from(h).unwrap_or(u32::MAX))
            }
            _ => (self.width, self.height),
        }
    }
}

pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Image(ImageValue),
    /// Markup embedded as an opaque referenced blob
    Fragment(String),
}

impl Value {
    pub fn text(text: impl Into<String>) -> Self {
        Value::Text(text.into())
    }

    pub fn fragment(markup: impl Into<String>) -> Self {
        Value::Fragment(markup.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Image(_) => "image",
            Value::Fragment(_) => "fragment",
        }
    }

    /// Convert an untyped JSON binding value.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        use serde_json::Value as Json;

        match json {
            Json::String(s) => Ok(Value::Text(s)),
            Json::Null => Ok(Value::Text(String::new())),
            Json::Object(mut map) if map.len() == 1 => {
                if let Some(markup) = map.remove("fragment") {
                    return match markup {
                        Json::String(s) => Ok(Value::Fragment(s)),
                        other => Err(unsupported("fragment", &other)),
                    };
                }
                if let Some(spec) = map.remove("image") {
                    let spec: ImageSpec = serde_json::from_value(spec).map_err(|e| {
                        MergeError::UnsupportedValueKind {
                            kind: format!("image ({})", e),
                        }
                    })?;
                    return spec.into_value();
                }
                let key = map.keys().next().cloned().unwrap_or_default();
                Err(MergeError::UnsupportedValueKind {
                    kind: format!("object with key '{}'", key),
                })
            }
            other => Err(MergeError::UnsupportedValueKind {
                kind: json_kind(&other).to_string(),
            }),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ImageValue> for Value {
    fn from(image: ImageValue) -> Self {
        Value::Image(image)
    }
}

/// JSON description of an image binding
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ImageSpec {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    base64: Option<String>,
    width: u32,
    height: u32,
    #[serde(default)]
    explicit_width: Option<u32>,
    #[serde(default)]
    content_type: Option<String>,
}

impl ImageSpec {
    fn into_value(self) -> Result<Value> {
        let payload = match (self.path, self.base64) {
            (Some(path), None) => ImagePayload::File(path),
            (None, Some(encoded)) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| MergeError::UnsupportedValueKind {
                        kind: format!("image (invalid base64: {})", e),
                    })?;
                ImagePayload::Bytes(bytes)
            }
            _ => {
                return Err(MergeError::UnsupportedValueKind {
                    kind: "image (exactly one of 'path' or 'base64' is required)".to_string(),
                })
            }
        };
        let mut image = ImageValue::new(payload, self.width, self.height);
        image.explicit_width = self.explicit_width;
        if let Some(content_type) = self.content_type {
            image.content_type = content_type;
        }
        Ok(Value::Image(image))
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    use serde_json::Value as Json;
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

fn unsupported(context: &str, json: &serde_json::Value) -> MergeError {
    MergeError::UnsupportedValueKind {
        kind: format!("{} given as {}", context, json_kind(json)),
    }
}

/// Ordered token name → value bindings.
///
/// Keys are stored as given; surrounding braces are trimmed when the token pattern is built,
/// so `"name"` and `"{{name}}"` bind the same token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings(Vec<(String, Value)>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing an earlier binding with the same key.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply `f` to every value, keeping names and order.
    pub fn map_values<F>(&self, mut f: F) -> Result<Bindings>
    where
        F: FnMut(&Value) -> Result<Value>,
    {
        self.0
            .iter()
            .map(|(n, v)| Ok((n.clone(), f(v)?)))
            .collect::<Result<Vec<_>>>()
            .map(Bindings)
    }

    /// Build bindings from a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => {
                let mut bindings = Bindings::new();
                for (name, value) in map {
                    bindings.insert(name, Value::from_json(value)?);
                }
                Ok(bindings)
            }
            other => Err(MergeError::UnsupportedValueKind {
                kind: format!("bindings given as {}", json_kind(&other)),
            }),
        }
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut bindings = Bindings::new();
        for (name, value) in iter {
            bindings.insert(name, value);
        }
        bindings
    }
}
