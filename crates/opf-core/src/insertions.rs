//! Pending character insertions.
//!
//! Rendering never edits the base text. Layers instead record strings to splice around
//! existing characters; everything is applied in one pass once all layers are in.
//!
//! For a coordinate `c`, the before-list is emitted immediately before character `c` and the
//! after-list immediately after it. Coordinate `len` (one past the last character) is a valid
//! slot, emitted at the very end of the volume.

use crate::text::VolumeId;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Where an inserted string goes relative to the character at its coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before the character. Later insertions wrap earlier ones (pushed to the front).
    Before,
    /// After the character. Later insertions follow earlier ones (pushed to the back).
    After,
}

/// Strings spliced around a single character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Insertions {
    /// Emitted before the character, in list order.
    pub before: VecDeque<String>,
    /// Emitted after the character, in list order.
    pub after: Vec<String>,
}

impl Insertions {
    fn push(&mut self, placement: Placement, text: String) {
        match placement {
            Placement::Before => self.before.push_front(text),
            Placement::After => self.after.push(text),
        }
    }
}

/// Per-volume map from character coordinate to its pending insertions.
///
/// Only coordinates that received at least one insertion have an entry.
#[derive(Debug, Clone, Default)]
pub struct InsertionMap {
    volumes: HashMap<VolumeId, BTreeMap<usize, Insertions>>,
}

impl InsertionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` at `coordinate`. Bounds are checked at render time.
    pub fn add(&mut self, volume: &VolumeId, coordinate: usize, placement: Placement, text: String) {
        log::trace!("insert {placement:?} {volume}:{coordinate} {text:?}");
        self.volumes
            .entry(volume.clone())
            .or_default()
            .entry(coordinate)
            .or_default()
            .push(placement, text);
    }

    /// Insertions recorded at a coordinate.
    pub fn get(&self, volume: &VolumeId, coordinate: usize) -> Option<&Insertions> {
        self.volumes.get(volume)?.get(&coordinate)
    }

    /// All insertions of a volume, ordered by coordinate.
    pub fn volume(&self, volume: &VolumeId) -> Option<&BTreeMap<usize, Insertions>> {
        self.volumes.get(volume)
    }

    /// Highest coordinate with insertions in a volume.
    pub fn max_coordinate(&self, volume: &VolumeId) -> Option<usize> {
        self.volumes
            .get(volume)?
            .last_key_value()
            .map(|(coordinate, _)| *coordinate)
    }

    /// Total number of coordinates carrying insertions, over all volumes.
    pub fn len(&self) -> usize {
        self.volumes.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The only handle a rendering strategy gets while applying an annotation.
///
/// It can add characters to the volume being processed and nothing else.
pub struct InsertionSink<'a> {
    volume: &'a VolumeId,
    map: &'a mut InsertionMap,
}

impl<'a> InsertionSink<'a> {
    pub(crate) fn new(volume: &'a VolumeId, map: &'a mut InsertionMap) -> Self {
        Self { volume, map }
    }

    /// The volume annotations are being applied to.
    pub fn volume(&self) -> &VolumeId {
        self.volume
    }

    /// Record `text` at `coordinate` of the current volume.
    pub fn add_chars(&mut self, coordinate: usize, placement: Placement, text: impl Into<String>) {
        self.map.add(self.volume, coordinate, placement, text.into());
    }
}
