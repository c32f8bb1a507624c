//! Moving whole annotation layers onto an updated base text.

use crate::matcher::ApproximateSearch;
use crate::updater::BaseLayerUpdater;
use opf_core::{Annotation, Layer};

/// Which end of an annotation could not be translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The start coordinate.
    Start,
    /// The end coordinate.
    End,
}

/// An annotation boundary that needs manual review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedBoundary {
    /// Index of the annotation in the layer.
    pub index: usize,
    /// The boundary that failed.
    pub boundary: Boundary,
    /// Its coordinate in the old text.
    pub coordinate: usize,
}

/// Outcome of [`rebase_layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebaseReport {
    /// The layer with every translatable boundary moved. Unresolved boundaries keep their old
    /// coordinate.
    pub layer: Layer,
    /// Boundaries that could not be translated.
    pub unresolved: Vec<UnresolvedBoundary>,
}

impl RebaseReport {
    /// Returns `true` if every boundary was translated.
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Translate the start and end of every annotation in `layer`.
pub fn rebase_layer<M: ApproximateSearch>(
    updater: &BaseLayerUpdater<M>,
    layer: &Layer,
) -> RebaseReport {
    let mut unresolved = Vec::new();
    let annotations = layer
        .annotations
        .iter()
        .enumerate()
        .map(|(index, annotation)| {
            let mut moved: Annotation = annotation.clone();
            for (boundary, coordinate) in [
                (Boundary::Start, &mut moved.start),
                (Boundary::End, &mut moved.end),
            ] {
                match updater.translate(*coordinate) {
                    Some(translated) => *coordinate = translated,
                    None => unresolved.push(UnresolvedBoundary {
                        index,
                        boundary,
                        coordinate: *coordinate,
                    }),
                }
            }
            moved
        })
        .collect();

    log::debug!(
        "rebased layer '{}': {} annotations, {} unresolved boundaries",
        layer.id,
        layer.annotations.len(),
        unresolved.len()
    );
    RebaseReport {
        layer: Layer::new(layer.id.clone(), annotations),
        unresolved,
    }
}
