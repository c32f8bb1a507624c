//! Base layer updates.
//!
//! When the base text of a volume is corrected, every annotation coordinate has to be moved to
//! the new text. [`BaseLayerUpdater`] answers "where is old coordinate `c` now?": exactly for
//! unchanged regions, and by searching for the coordinate's context otherwise.

use crate::diff::{DiffPrimitive, SimilarDiff};
use crate::matcher::{ApproximateSearch, Context, ContextMatcher};
use crate::vector::{Lookup, TranslationVector};

/// Sentinel returned by [`BaseLayerUpdater::translate_coord`] when a coordinate cannot be
/// translated.
pub const UNTRANSLATABLE: i64 = -1;

/// Options that control how coordinates are re-located.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdaterOptions {
    /// Characters of context taken on each side of a coordinate.
    pub context_len: usize,
    /// Maximum accepted match score (error ratio plus proximity penalty).
    pub match_threshold: f64,
    /// Distance, in characters, at which proximity alone costs a full score unit.
    pub match_distance: usize,
}

impl Default for UpdaterOptions {
    fn default() -> Self {
        Self {
            context_len: 16,
            match_threshold: 0.5,
            match_distance: 1000,
        }
    }
}

/// Translates character coordinates of an old base text into a new one.
#[derive(Debug, Clone)]
pub struct BaseLayerUpdater<M = ContextMatcher> {
    src: Vec<char>,
    dst: Vec<char>,
    vector: TranslationVector,
    context_len: usize,
    matcher: M,
}

impl BaseLayerUpdater {
    /// Create an updater with default options.
    pub fn new(src: &str, dst: &str) -> Self {
        Self::with_options(src, dst, UpdaterOptions::default())
    }

    /// Create an updater using `similar` for the diff and [`ContextMatcher`] for fuzzy search.
    pub fn with_options(src: &str, dst: &str, options: UpdaterOptions) -> Self {
        let matcher = ContextMatcher::new(options.match_threshold, options.match_distance);
        Self::with_primitives(src, dst, options.context_len, &SimilarDiff::default(), matcher)
    }
}

impl<M: ApproximateSearch> BaseLayerUpdater<M> {
    /// Create an updater from explicit diff and search primitives.
    pub fn with_primitives(
        src: &str,
        dst: &str,
        context_len: usize,
        differ: &(impl DiffPrimitive + ?Sized),
        matcher: M,
    ) -> Self {
        Self {
            src: src.chars().collect(),
            dst: dst.chars().collect(),
            vector: TranslationVector::build(src, dst, differ),
            context_len,
            matcher,
        }
    }

    /// The unchanged regions between the two texts.
    pub fn translation_vector(&self) -> &TranslationVector {
        &self.vector
    }

    /// Context length per side.
    pub fn context_len(&self) -> usize {
        self.context_len
    }

    /// Offset for `coordinate`, and whether it is exact.
    pub fn lookup(&self, coordinate: usize) -> Lookup {
        self.vector.lookup(coordinate)
    }

    /// Up to `context_len` characters on each side of `coordinate` in the old text.
    pub fn context(&self, coordinate: usize) -> Context {
        let at = coordinate.min(self.src.len());
        let left_start = at.saturating_sub(self.context_len);
        let right_end = at.saturating_add(self.context_len).min(self.src.len());
        Context {
            left: self.src[left_start..at].iter().collect(),
            right: self.src[at..right_end].iter().collect(),
        }
    }

    /// Locate `context` in the new text near `expected`.
    pub fn fuzzy_locate(&self, context: &Context, expected: usize) -> Option<usize> {
        self.matcher
            .locate(&self.dst, context, expected)
            .map(|found| found.location)
    }

    /// Translate an old coordinate into the new text; `None` if it cannot be re-located.
    pub fn translate(&self, coordinate: usize) -> Option<usize> {
        let Lookup { offset, certain } = self.lookup(coordinate);
        let estimate = coordinate.saturating_add_signed(offset);
        if certain {
            return Some(estimate);
        }

        log::warn!("coordinate {coordinate} is in a changed region, searching near {estimate}");
        let found = self.fuzzy_locate(&self.context(coordinate), estimate);
        if found.is_none() {
            log::warn!("no match for the context of coordinate {coordinate}");
        }
        found
    }

    /// [`BaseLayerUpdater::translate`] with [`UNTRANSLATABLE`] standing in for `None`.
    pub fn translate_coord(&self, coordinate: usize) -> i64 {
        self.translate(coordinate)
            .and_then(|c| i64::try_from(c).ok())
            .unwrap_or(UNTRANSLATABLE)
    }
}
