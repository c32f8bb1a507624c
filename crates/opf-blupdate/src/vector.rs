//! Character coordinate translation vectors.
//!
//! A [`TranslationVector`] lists the regions of the old text that survived unchanged in the new
//! text, each with the constant offset to add to an old coordinate to get the new one. Gaps
//! between regions are the parts that changed; coordinates there only get an estimate.

use crate::diff::{DiffOp, DiffPrimitive};

/// An unchanged region `start..end` of the old text and its coordinate offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triple {
    /// Inclusive start, in old-text characters.
    pub start: usize,
    /// Exclusive end, in old-text characters.
    pub end: usize,
    /// Offset to add to an old coordinate in this region.
    pub offset: isize,
}

impl Triple {
    /// Create a triple.
    pub fn new(start: usize, end: usize, offset: isize) -> Self {
        Self { start, end, offset }
    }

    /// Check if the region contains a coordinate.
    pub fn contains(&self, coordinate: usize) -> bool {
        self.start <= coordinate && coordinate < self.end
    }
}

impl From<(usize, usize, isize)> for Triple {
    fn from((start, end, offset): (usize, usize, isize)) -> Self {
        Self::new(start, end, offset)
    }
}

/// Result of looking a coordinate up in a [`TranslationVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    /// Offset to add to the coordinate (exact or estimated).
    pub offset: isize,
    /// `true` if the coordinate lies in an unchanged region.
    pub certain: bool,
}

/// Sorted, non-overlapping unchanged regions of the old text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationVector {
    triples: Vec<Triple>,
    src_len: usize,
    /// Both texts end with an unchanged region (or are both empty).
    tail_aligned: bool,
}

impl TranslationVector {
    /// Diff `src` against `dst` and build the vector.
    pub fn build(src: &str, dst: &str, differ: &(impl DiffPrimitive + ?Sized)) -> Self {
        let vector = Self::from_ops(&differ.diff(src, dst));
        log::debug!(
            "translation vector: {} unchanged regions over {} chars",
            vector.triples.len(),
            vector.src_len
        );
        vector
    }

    /// Build the vector from diff runs.
    pub fn from_ops(ops: &[DiffOp]) -> Self {
        let mut triples: Vec<Triple> = Vec::new();
        let mut offset: isize = 0;
        let mut cursor = 0usize;
        let mut tail_aligned = true;

        for op in ops {
            match *op {
                DiffOp::Equal(0) | DiffOp::Insert(0) | DiffOp::Delete(0) => continue,
                DiffOp::Equal(len) => {
                    match triples.last_mut() {
                        Some(last) if last.end == cursor && last.offset == offset => {
                            last.end += len;
                        }
                        _ => triples.push(Triple::new(cursor, cursor + len, offset)),
                    }
                    cursor += len;
                    tail_aligned = true;
                }
                DiffOp::Insert(len) => {
                    offset += len as isize;
                    tail_aligned = false;
                }
                DiffOp::Delete(len) => {
                    offset -= len as isize;
                    cursor += len;
                    tail_aligned = false;
                }
            }
        }

        Self {
            triples,
            src_len: cursor,
            tail_aligned,
        }
    }

    /// The unchanged regions, sorted by start.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Length of the old text in characters.
    pub fn src_len(&self) -> usize {
        self.src_len
    }

    /// Offset for `coordinate`: exact inside an unchanged region, otherwise the average of the
    /// neighbouring regions' offsets (rounded half up).
    ///
    /// End-of-text rule: `src_len` lies outside every region, but it is reported as exact
    /// (with the last region's offset) when both texts end with unchanged content. That keeps
    /// the end of an unmodified text, and annotations closing there, on the certain path.
    pub fn lookup(&self, coordinate: usize) -> Lookup {
        let idx = self.triples.partition_point(|t| t.end <= coordinate);

        if let Some(triple) = self.triples.get(idx)
            && triple.contains(coordinate)
        {
            return Lookup {
                offset: triple.offset,
                certain: true,
            };
        }

        if coordinate == self.src_len && self.tail_aligned {
            return Lookup {
                offset: self.triples.last().map_or(0, |t| t.offset),
                certain: true,
            };
        }

        let before = idx.checked_sub(1).and_then(|i| self.triples.get(i));
        let after = self.triples.get(idx);
        let offset = match (before, after) {
            (Some(b), Some(a)) => (b.offset + a.offset + 1).div_euclid(2),
            (Some(t), None) | (None, Some(t)) => t.offset,
            (None, None) => 0,
        };
        Lookup {
            offset,
            certain: false,
        }
    }
}
