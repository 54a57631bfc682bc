//! Byte sources for mocked responses.
//!
//! A [`ReadStrategy`] knows where the body of a mocked response comes from.
//! Strategies are shared through `Arc<dyn ReadStrategy>` so one fixture can
//! back several mocks.

use crate::error::MockError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Supplies the raw bytes of a mocked response.
///
/// `read` may block (file reads); the response pipeline always calls it off
/// the async worker threads.
pub trait ReadStrategy: Send + Sync {
    fn read(&self) -> Result<Bytes, MockError>;
}

impl<F> ReadStrategy for F
where
    F: Fn() -> Result<Bytes, MockError> + Send + Sync,
{
    fn read(&self) -> Result<Bytes, MockError> {
        self()
    }
}

/// Character encodings accepted by [`DataReadStrategy::from_text`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Ascii,
    /// ISO-8859-1
    Latin1,
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Ascii => "US-ASCII",
            TextEncoding::Latin1 => "ISO-8859-1",
        }
    }

    /// Encode `text`, or `None` if a character has no representation.
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
            TextEncoding::Utf16Le => Some(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Utf16Be => Some(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            TextEncoding::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { Some(c as u8) } else { None })
                .collect(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).ok())
                .collect(),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Always returns the bytes it was built with.
#[derive(Debug, Clone)]
pub struct DataReadStrategy {
    data: Bytes,
}

impl DataReadStrategy {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Serialize a JSON document. The top level must be an object or an array.
    pub fn from_json(json: &Value) -> Result<Self, MockError> {
        if !(json.is_object() || json.is_array()) {
            return Err(MockError::Serialization(
                "trying to transform invalid json to data: top level must be an object or array"
                    .to_string(),
            ));
        }
        let data =
            serde_json::to_vec(json).map_err(|e| MockError::Serialization(e.to_string()))?;
        Ok(Self::new(data))
    }

    /// Serialize any value as JSON, with the same top-level rule as [`from_json`](Self::from_json).
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, MockError> {
        let json =
            serde_json::to_value(value).map_err(|e| MockError::Serialization(e.to_string()))?;
        Self::from_json(&json)
    }

    /// Encode `text` with `encoding`.
    pub fn from_text(text: &str, encoding: TextEncoding) -> Result<Self, MockError> {
        encoding
            .encode(text)
            .map(Self::new)
            .ok_or(MockError::Unencodable {
                encoding: encoding.name(),
            })
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl ReadStrategy for DataReadStrategy {
    fn read(&self) -> Result<Bytes, MockError> {
        Ok(self.data.clone())
    }
}

/// A named container of fixture files.
pub trait ResourceBundle: Send + Sync {
    /// Name used in error messages.
    fn name(&self) -> &str;

    /// Location of `name`.`extension`, if the bundle has it.
    fn locate(&self, name: &str, extension: &str) -> Option<PathBuf>;
}

/// A directory of fixture files.
#[derive(Debug, Clone)]
pub struct DirectoryBundle {
    root: PathBuf,
    name: String,
}

impl DirectoryBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceBundle for DirectoryBundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate(&self, name: &str, extension: &str) -> Option<PathBuf> {
        let extension = extension.trim_start_matches('.');
        let file_name = if extension.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", name, extension)
        };
        let path = self.root.join(file_name);
        path.is_file().then_some(path)
    }
}

/// Looks the fixture up in its bundle on every read.
#[derive(Clone)]
pub struct BundleReadStrategy {
    bundle: Arc<dyn ResourceBundle>,
    name: String,
    extension: String,
}

impl BundleReadStrategy {
    pub fn new(
        bundle: Arc<dyn ResourceBundle>,
        name: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            bundle,
            name: name.into(),
            extension: extension.into(),
        }
    }

    /// A `.json` fixture.
    pub fn json(bundle: Arc<dyn ResourceBundle>, name: impl Into<String>) -> Self {
        Self::new(bundle, name, "json")
    }
}

impl fmt::Debug for BundleReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleReadStrategy")
            .field("bundle", &self.bundle.name())
            .field("name", &self.name)
            .field("extension", &self.extension)
            .finish()
    }
}

impl ReadStrategy for BundleReadStrategy {
    fn read(&self) -> Result<Bytes, MockError> {
        let location = self
            .bundle
            .locate(&self.name, &self.extension)
            .ok_or_else(|| MockError::SourceNotFound {
                bundle: self.bundle.name().to_string(),
                name: self.name.clone(),
                extension: self.extension.trim_start_matches('.').to_string(),
            })?;
        read_location(&location)
    }
}

/// Reads a fixed location on every call.
#[derive(Debug, Clone)]
pub struct UrlReadStrategy {
    location: PathBuf,
}

impl UrlReadStrategy {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Resolve `name`.`extension` in `bundle` now; fails if it is missing.
    pub fn from_bundle(
        bundle: &dyn ResourceBundle,
        name: &str,
        extension: &str,
    ) -> Result<Self, MockError> {
        bundle
            .locate(name, extension)
            .map(Self::new)
            .ok_or_else(|| MockError::SourceNotFound {
                bundle: bundle.name().to_string(),
                name: name.to_string(),
                extension: extension.trim_start_matches('.').to_string(),
            })
    }

    /// Resolve a `.json` fixture in `bundle` now.
    pub fn json_in_bundle(bundle: &dyn ResourceBundle, name: &str) -> Result<Self, MockError> {
        Self::from_bundle(bundle, name, "json")
    }

    pub fn location(&self) -> &Path {
        &self.location
    }
}

impl ReadStrategy for UrlReadStrategy {
    fn read(&self) -> Result<Bytes, MockError> {
        read_location(&self.location)
    }
}

/// Fails every read. Simulates a broken fixture or an upstream error.
#[derive(Debug, Clone)]
pub struct FailingReadStrategy {
    reason: String,
}

impl FailingReadStrategy {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl ReadStrategy for FailingReadStrategy {
    fn read(&self) -> Result<Bytes, MockError> {
        Err(MockError::Injected(self.reason.clone()))
    }
}

fn read_location(location: &Path) -> Result<Bytes, MockError> {
    std::fs::read(location)
        .map(Bytes::from)
        .map_err(|source| MockError::Read {
            location: location.display().to_string(),
            source,
        })
}
