//! Annotation layers.
//!
//! A layer is a named list of annotations for one volume (titles, pagination, citations, ...).
//! The layer id doubles as the annotation type that rendering strategies dispatch on.

use std::collections::BTreeMap;
use std::fmt;

/// Layer identifier, also used as the annotation type (e.g. `BookTitle`, `Pagination`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub String);

impl LayerId {
    /// Create a layer id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Layer-specific annotation data (title text, page number, ...), keyed by field name.
pub type Payload = BTreeMap<String, String>;

/// A typed record over the half-open character range `start..end` of a volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Layer type; attached when the annotation is applied as part of a layer.
    pub kind: Option<LayerId>,
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
    /// Layer-specific fields.
    pub payload: Payload,
}

impl Annotation {
    /// Create an untyped annotation with an empty payload.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            kind: None,
            start,
            end,
            payload: Payload::new(),
        }
    }

    /// Add a payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Look up a payload field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }

    /// Returns `true` for point annotations (`start == end`).
    pub fn is_point(&self) -> bool {
        self.start == self.end
    }
}

/// A named, ordered set of annotations scoped to one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Layer identifier.
    pub id: LayerId,
    /// Annotations in file order.
    pub annotations: Vec<Annotation>,
}

impl Layer {
    /// Create a layer.
    pub fn new(id: impl Into<LayerId>, annotations: Vec<Annotation>) -> Self {
        Self {
            id: id.into(),
            annotations,
        }
    }
}
