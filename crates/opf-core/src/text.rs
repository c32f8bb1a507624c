//! Base text model.
//!
//! A pecha's base text is split into volumes. Every annotation coordinate is a **character
//! offset** (Unicode scalar values) into a volume's text, counted after a single leading
//! byte-order mark has been removed.

use std::collections::BTreeMap;
use std::fmt;

/// The byte-order mark some editors prepend to volume files.
pub const BOM: char = '\u{feff}';

/// Identifier of a volume (e.g. `v001`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VolumeId(pub String);

impl VolumeId {
    /// Create a volume id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VolumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VolumeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The BOM-stripped text of one volume, indexed by character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeText {
    text: String,
    /// `char_to_byte[i]` is the byte offset of character `i`; the last entry is `text.len()`.
    char_to_byte: Vec<usize>,
}

impl VolumeText {
    /// Build a volume text from its raw content, dropping a leading BOM if present.
    pub fn new(raw: &str) -> Self {
        let text = raw.strip_prefix(BOM).unwrap_or(raw).to_string();
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self { text, char_to_byte }
    }

    /// The stripped text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of characters (the end-of-volume coordinate).
    pub fn char_count(&self) -> usize {
        self.char_to_byte.len() - 1
    }

    /// Returns `true` if the volume has no characters.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of a character offset, clamped to the end of the text.
    pub(crate) fn char_to_byte(&self, char_offset: usize) -> usize {
        let clamped = char_offset.min(self.char_count());
        self.char_to_byte[clamped]
    }

    /// Substring covering `from..to`; offsets past the end are clamped.
    pub(crate) fn segment(&self, from: usize, to: usize) -> &str {
        &self.text[self.char_to_byte(from)..self.char_to_byte(to)]
    }

    /// Substring covering the half-open character range `start..end`, if in bounds.
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        if start > end || end > self.char_count() {
            return None;
        }
        self.text
            .get(self.char_to_byte(start)..self.char_to_byte(end))
    }
}

/// All volumes of a pecha, keyed by volume id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseText {
    volumes: BTreeMap<VolumeId, VolumeText>,
}

impl BaseText {
    /// Create an empty base text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a volume from its raw content.
    pub fn insert_volume(&mut self, volume: VolumeId, raw: &str) {
        self.volumes.insert(volume, VolumeText::new(raw));
    }

    /// Builder-style variant of [`BaseText::insert_volume`].
    pub fn with_volume(mut self, volume: impl Into<VolumeId>, raw: &str) -> Self {
        self.insert_volume(volume.into(), raw);
        self
    }

    /// Look up a volume.
    pub fn volume(&self, volume: &VolumeId) -> Option<&VolumeText> {
        self.volumes.get(volume)
    }

    /// Iterate over volumes in id order.
    pub fn volumes(&self) -> impl Iterator<Item = (&VolumeId, &VolumeText)> {
        self.volumes.iter()
    }

    /// Number of volumes.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// Returns `true` if no volume has been loaded.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

/// A half-open character range (`start..end`) of one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// The volume this span points into.
    pub volume: VolumeId,
    /// Inclusive start character offset.
    pub start: usize,
    /// Exclusive end character offset.
    pub end: usize,
}

impl Span {
    /// Create a span.
    pub fn new(volume: impl Into<VolumeId>, start: usize, end: usize) -> Self {
        Self {
            volume: volume.into(),
            start,
            end,
        }
    }

    /// Length of the span in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A logical work: an ordered list of spans, possibly across several volumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Work {
    /// Work identifier as found in the index.
    pub id: String,
    /// Spans in reading order.
    pub spans: Vec<Span>,
}

impl Work {
    /// Create a work.
    pub fn new(id: impl Into<String>, spans: Vec<Span>) -> Self {
        Self {
            id: id.into(),
            spans,
        }
    }

    /// Distinct volumes referenced by this work, in span order.
    pub fn volumes(&self) -> Vec<&VolumeId> {
        let mut seen: Vec<&VolumeId> = Vec::new();
        for span in &self.spans {
            if !seen.contains(&&span.volume) {
                seen.push(&span.volume);
            }
        }
        seen
    }
}
