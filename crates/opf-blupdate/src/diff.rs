//! Character-level diff primitive.
//!
//! The updater only needs run lengths: how many characters are common to both texts, present
//! only in the new text, or present only in the old one. Any diff algorithm producing such a
//! sequence can be plugged in through [`DiffPrimitive`].

use similar::{Algorithm, DiffTag, TextDiff};

/// One run of a character diff, measured in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    /// Characters common to both texts (consumes both cursors).
    Equal(usize),
    /// Characters only present in the new text.
    Insert(usize),
    /// Characters only present in the old text.
    Delete(usize),
}

/// Computes a diff between two texts.
///
/// The returned runs must cover both texts fully and in order.
pub trait DiffPrimitive {
    /// Diff `old` against `new`, in characters.
    fn diff(&self, old: &str, new: &str) -> Vec<DiffOp>;
}

/// [`DiffPrimitive`] backed by the `similar` crate.
#[derive(Debug, Clone, Copy)]
pub struct SimilarDiff {
    algorithm: Algorithm,
}

impl SimilarDiff {
    /// Use a specific diff algorithm.
    pub fn new(algorithm: Algorithm) -> Self {
        Self { algorithm }
    }

    /// The configured algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }
}

impl Default for SimilarDiff {
    fn default() -> Self {
        Self::new(Algorithm::Myers)
    }
}

impl DiffPrimitive for SimilarDiff {
    fn diff(&self, old: &str, new: &str) -> Vec<DiffOp> {
        let diff = TextDiff::configure()
            .algorithm(self.algorithm)
            .diff_chars(old, new);

        let mut ops = Vec::new();
        for op in diff.ops() {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            match tag {
                DiffTag::Equal => ops.push(DiffOp::Equal(old_range.len())),
                DiffTag::Delete => ops.push(DiffOp::Delete(old_range.len())),
                DiffTag::Insert => ops.push(DiffOp::Insert(new_range.len())),
                DiffTag::Replace => {
                    ops.push(DiffOp::Delete(old_range.len()));
                    ops.push(DiffOp::Insert(new_range.len()));
                }
            }
        }
        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_characters_not_bytes() {
        let ops = SimilarDiff::default().diff("ཀཁག", "ཀངག");
        let old: usize = ops
            .iter()
            .map(|op| match op {
                DiffOp::Equal(n) | DiffOp::Delete(n) => *n,
                DiffOp::Insert(_) => 0,
            })
            .sum();
        assert_eq!(old, 3);
        assert_eq!(ops.first(), Some(&DiffOp::Equal(1)));
        assert_eq!(ops.last(), Some(&DiffOp::Equal(1)));
    }
}
