//! Layer composition and rendering.
//!
//! [`LayerCompositor`] merges any number of annotation layers into one rendered string without
//! touching the base text: layers only record insertions (see [`crate::insertions`]), and
//! rendering splices them in a single forward pass over each span.

use crate::annotation::{Annotation, Layer, LayerId};
use crate::error::CompositionError;
use crate::insertions::{InsertionMap, InsertionSink, Insertions, Placement};
use crate::source::{BaseTextSource, IndexSource, LayerSource};
use crate::text::{BaseText, Span, VolumeId, VolumeText, Work};
use std::fmt::Write;

/// An output format (Markdown, TEI, ...): decides what to insert for each annotation.
///
/// Implementations must only record insertions through the given sink.
pub trait AnnotationRenderer {
    /// Record the insertions for one annotation. `annotation.kind` is always set.
    fn apply_annotation(
        &self,
        annotation: &Annotation,
        sink: &mut InsertionSink<'_>,
    ) -> Result<(), CompositionError>;
}

impl<R: AnnotationRenderer + ?Sized> AnnotationRenderer for &R {
    fn apply_annotation(
        &self,
        annotation: &Annotation,
        sink: &mut InsertionSink<'_>,
    ) -> Result<(), CompositionError> {
        (**self).apply_annotation(annotation, sink)
    }
}

/// Which layers to apply to a volume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayerSelection {
    /// Every layer the source has for the volume, in lexicographic order.
    #[default]
    All,
    /// Exactly these layers, in this order.
    Only(Vec<LayerId>),
}

impl LayerSelection {
    /// Resolve the ordered list of layers to apply to `volume`.
    pub fn resolve(
        &self,
        source: &(impl LayerSource + ?Sized),
        volume: &VolumeId,
    ) -> Result<Vec<LayerId>, CompositionError> {
        match self {
            Self::All => {
                let mut ids = source.layer_ids(volume)?;
                ids.sort();
                Ok(ids)
            }
            Self::Only(ids) => Ok(ids.clone()),
        }
    }
}

/// Applies annotation layers over a base text and renders the result.
pub struct LayerCompositor<R> {
    base: BaseText,
    renderer: R,
    insertions: InsertionMap,
}

impl<R: AnnotationRenderer> LayerCompositor<R> {
    /// Create a compositor over `base` using `renderer` as the output format.
    pub fn new(base: BaseText, renderer: R) -> Self {
        Self {
            base,
            renderer,
            insertions: InsertionMap::new(),
        }
    }

    /// Load a work and its volumes from `source`, apply `selection` to every volume of the work,
    /// and render it.
    pub fn compose<S>(
        source: &S,
        work_id: &str,
        renderer: R,
        selection: &LayerSelection,
    ) -> Result<String, CompositionError>
    where
        S: LayerSource + IndexSource + BaseTextSource + ?Sized,
    {
        let work = source.work(work_id)?;
        let base = source.load_base_text(&work)?;
        let mut compositor = Self::new(base, renderer);
        for volume in work.volumes() {
            compositor.apply_layers(source, volume, selection)?;
        }
        compositor.render_work(&work)
    }

    /// The base text being rendered.
    pub fn base_text(&self) -> &BaseText {
        &self.base
    }

    /// The output format.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Insertions recorded so far.
    pub fn insertions(&self) -> &InsertionMap {
        &self.insertions
    }

    /// Record `text` at `coordinate` of `volume`. Bounds are checked when rendering.
    pub fn add_chars(
        &mut self,
        volume: &VolumeId,
        coordinate: usize,
        placement: Placement,
        text: impl Into<String>,
    ) {
        self.insertions
            .add(volume, coordinate, placement, text.into());
    }

    /// Hand one typed annotation to the renderer.
    ///
    /// The annotation must satisfy `start <= end <= len` for its volume.
    pub fn apply_annotation(
        &mut self,
        volume: &VolumeId,
        annotation: &Annotation,
    ) -> Result<(), CompositionError> {
        let Some(layer) = &annotation.kind else {
            return Err(CompositionError::UntypedAnnotation);
        };
        let len = self.volume_text(volume)?.char_count();
        if annotation.start > annotation.end || annotation.end > len {
            return Err(CompositionError::AnnotationOutOfBounds {
                layer: layer.clone(),
                volume: volume.clone(),
                start: annotation.start,
                end: annotation.end,
                len,
            });
        }
        let mut sink = InsertionSink::new(volume, &mut self.insertions);
        self.renderer.apply_annotation(annotation, &mut sink)
    }

    /// Apply an already loaded layer: every annotation is tagged with the layer id and applied
    /// in file order.
    pub fn apply_layer_data(
        &mut self,
        volume: &VolumeId,
        layer: Layer,
    ) -> Result<(), CompositionError> {
        log::debug!(
            "applying layer '{}' to volume '{}' ({} annotations)",
            layer.id,
            volume,
            layer.annotations.len()
        );
        for mut annotation in layer.annotations {
            annotation.kind = Some(layer.id.clone());
            self.apply_annotation(volume, &annotation)?;
        }
        Ok(())
    }

    /// Load `layer` for `volume` from `source` and apply it.
    pub fn apply_layer(
        &mut self,
        source: &(impl LayerSource + ?Sized),
        volume: &VolumeId,
        layer: &LayerId,
    ) -> Result<(), CompositionError> {
        let layer = source.load_layer(volume, layer)?;
        self.apply_layer_data(volume, layer)
    }

    /// Apply the selected layers to `volume`, in selection order.
    pub fn apply_layers(
        &mut self,
        source: &(impl LayerSource + ?Sized),
        volume: &VolumeId,
        selection: &LayerSelection,
    ) -> Result<(), CompositionError> {
        for layer in selection.resolve(source, volume)? {
            self.apply_layer(source, volume, &layer)?;
        }
        Ok(())
    }

    /// Render a work: the rendering of each span, concatenated in span order.
    pub fn render_work(&self, work: &Work) -> Result<String, CompositionError> {
        let capacity = work.spans.iter().map(Span::len).sum::<usize>();
        let mut out = String::with_capacity(capacity);
        self.render_work_to(work, &mut out)?;
        Ok(out)
    }

    /// Streaming variant of [`LayerCompositor::render_work`].
    pub fn render_work_to<W: Write>(&self, work: &Work, out: &mut W) -> Result<(), CompositionError> {
        log::debug!("rendering work '{}' ({} spans)", work.id, work.spans.len());
        for volume in work.volumes() {
            self.check_insertion_bounds(volume)?;
        }
        for span in &work.spans {
            self.render_span(span, out)?;
        }
        Ok(())
    }

    /// Render a whole volume.
    pub fn render_volume(&self, volume: &VolumeId) -> Result<String, CompositionError> {
        let len = self.volume_text(volume)?.char_count();
        self.render_work(&Work::new(volume.as_str(), vec![Span::new(volume.clone(), 0, len)]))
    }

    fn volume_text(&self, volume: &VolumeId) -> Result<&VolumeText, CompositionError> {
        self.base
            .volume(volume)
            .ok_or_else(|| CompositionError::UnknownVolume(volume.clone()))
    }

    fn check_insertion_bounds(&self, volume: &VolumeId) -> Result<(), CompositionError> {
        let len = self.volume_text(volume)?.char_count();
        match self.insertions.max_coordinate(volume) {
            Some(coordinate) if coordinate > len => Err(CompositionError::InsertionOutOfBounds {
                volume: volume.clone(),
                coordinate,
                len,
            }),
            _ => Ok(()),
        }
    }

    fn render_span<W: Write>(&self, span: &Span, out: &mut W) -> Result<(), CompositionError> {
        let text = self.volume_text(&span.volume)?;
        let len = text.char_count();
        if span.start > span.end || span.end > len {
            return Err(CompositionError::SpanOutOfBounds {
                volume: span.volume.clone(),
                start: span.start,
                end: span.end,
                len,
            });
        }

        let Some(insertions) = self.insertions.volume(&span.volume) else {
            out.write_str(text.segment(span.start, span.end))?;
            return Ok(());
        };

        let mut cursor = span.start;
        for (&coordinate, entry) in insertions.range(span.start..span.end) {
            out.write_str(text.segment(cursor, coordinate))?;
            write_entry(out, entry, text.segment(coordinate, coordinate + 1))?;
            cursor = coordinate + 1;
        }
        out.write_str(text.segment(cursor, span.end))?;

        // The end-of-volume slot belongs to the span that reaches the end.
        if span.end == len
            && let Some(entry) = insertions.get(&len)
        {
            write_entry(out, entry, "")?;
        }
        Ok(())
    }
}

fn write_entry<W: Write>(out: &mut W, entry: &Insertions, ch: &str) -> std::fmt::Result {
    for s in &entry.before {
        out.write_str(s)?;
    }
    out.write_str(ch)?;
    for s in &entry.after {
        out.write_str(s)?;
    }
    Ok(())
}
