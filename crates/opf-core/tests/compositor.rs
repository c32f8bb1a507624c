use opf_core::{
    Annotation, AnnotationRenderer, BaseText, CompositionError, InsertionSink, Layer,
    LayerCompositor, LayerId, LayerSelection, MemorySource, Placement, SourceError, Span, VolumeId,
    Work,
};
use pretty_assertions::assert_eq;

/// Wraps every annotation in `<kind>`/`</kind>`; point annotations become `<kind/>`.
struct TagRenderer;

impl AnnotationRenderer for TagRenderer {
    fn apply_annotation(
        &self,
        annotation: &Annotation,
        sink: &mut InsertionSink<'_>,
    ) -> Result<(), CompositionError> {
        let kind = annotation
            .kind
            .as_ref()
            .ok_or(CompositionError::UntypedAnnotation)?;
        if kind.as_str() == "Unknown" {
            return Err(CompositionError::UnsupportedLayer(kind.clone()));
        }
        if annotation.is_point() {
            sink.add_chars(annotation.start, Placement::Before, format!("<{kind}/>"));
        } else {
            sink.add_chars(annotation.start, Placement::Before, format!("<{kind}>"));
            sink.add_chars(annotation.end - 1, Placement::After, format!("</{kind}>"));
        }
        Ok(())
    }
}

/// Inserts the layer name before the start and after the end of each annotation.
struct MarkerRenderer;

impl AnnotationRenderer for MarkerRenderer {
    fn apply_annotation(
        &self,
        annotation: &Annotation,
        sink: &mut InsertionSink<'_>,
    ) -> Result<(), CompositionError> {
        let kind = annotation.kind.as_ref().map(LayerId::as_str).unwrap_or("?");
        sink.add_chars(annotation.start, Placement::Before, kind);
        sink.add_chars(annotation.end, Placement::After, kind.to_lowercase());
        Ok(())
    }
}

fn whole_volume(volume: &str, len: usize) -> Work {
    Work::new("w", vec![Span::new(volume, 0, len)])
}

#[test]
fn test_zero_layers_is_identity() {
    let base = BaseText::new().with_volume("v1", "\u{feff}ཀ་ཁ་ག།\nline two");
    let compositor = LayerCompositor::new(base, TagRenderer);

    let rendered = compositor.render_volume(&VolumeId::new("v1")).unwrap();
    assert_eq!(rendered, "ཀ་ཁ་ག།\nline two");
}

#[test]
fn test_bom_does_not_shift_coordinates() {
    let base = BaseText::new().with_volume("v1", "\u{feff}abc");
    let mut compositor = LayerCompositor::new(base, TagRenderer);
    compositor
        .apply_layer_data(&VolumeId::new("v1"), Layer::new("b", vec![Annotation::new(1, 2)]))
        .unwrap();

    assert_eq!(
        compositor.render_volume(&VolumeId::new("v1")).unwrap(),
        "a<b>b</b>c"
    );
}

#[test]
fn test_later_layer_wraps_before_and_follows_after() {
    let volume = VolumeId::new("v1");
    let base = BaseText::new().with_volume("v1", "xyz");
    let mut compositor = LayerCompositor::new(base, MarkerRenderer);
    compositor
        .apply_layer_data(&volume, Layer::new("A", vec![Annotation::new(1, 1)]))
        .unwrap();
    compositor
        .apply_layer_data(&volume, Layer::new("B", vec![Annotation::new(1, 1)]))
        .unwrap();

    // B was applied last: its "before" text is outermost, its "after" text comes last.
    assert_eq!(compositor.render_volume(&volume).unwrap(), "xBAyabz");
}

#[test]
fn test_shared_boundaries_nest() {
    let volume = VolumeId::new("v1");
    let base = BaseText::new().with_volume("v1", "title body");
    let mut compositor = LayerCompositor::new(base, TagRenderer);
    compositor
        .apply_layer_data(&volume, Layer::new("i", vec![Annotation::new(0, 5)]))
        .unwrap();
    compositor
        .apply_layer_data(&volume, Layer::new("h", vec![Annotation::new(0, 5)]))
        .unwrap();

    assert_eq!(
        compositor.render_volume(&volume).unwrap(),
        "<h><i>title</i></h> body"
    );
}

#[test]
fn test_multi_volume_work_renders_every_span() {
    let source = MemorySource::new()
        .with_volume("v1", "first volume")
        .with_volume("v2", "\u{feff}second volume")
        .with_layer("v1", Layer::new("t", vec![Annotation::new(6, 12)]))
        .with_layer("v2", Layer::new("t", vec![Annotation::new(0, 6)]))
        .with_work(
            "w1",
            vec![Span::new("v1", 6, 12), Span::new("v2", 0, 6)],
        );

    let text =
        LayerCompositor::compose(&source, "w1", TagRenderer, &LayerSelection::All).unwrap();
    assert_eq!(text, "<t>volume</t><t>second</t>");
}

#[test]
fn test_span_only_renders_its_range() {
    let volume = VolumeId::new("v1");
    let base = BaseText::new().with_volume("v1", "0123456789");
    let mut compositor = LayerCompositor::new(base, TagRenderer);
    compositor
        .apply_layer_data(
            &volume,
            Layer::new("x", vec![Annotation::new(1, 2), Annotation::new(4, 6)]),
        )
        .unwrap();

    let work = Work::new("w", vec![Span::new("v1", 3, 7)]);
    assert_eq!(compositor.render_work(&work).unwrap(), "3<x>45</x>6");
}

#[test]
fn test_end_of_volume_slot() {
    let volume = VolumeId::new("v1");
    let base = BaseText::new().with_volume("v1", "abc");
    let mut compositor = LayerCompositor::new(base, TagRenderer);
    compositor
        .apply_layer_data(&volume, Layer::new("pb", vec![Annotation::new(3, 3)]))
        .unwrap();

    assert_eq!(compositor.render_volume(&volume).unwrap(), "abc<pb/>");
    // A span stopping short of the end does not own the slot.
    assert_eq!(
        compositor
            .render_work(&Work::new("w", vec![Span::new("v1", 0, 2)]))
            .unwrap(),
        "ab"
    );
}

#[test]
fn test_insertion_past_end_is_reported() {
    let volume = VolumeId::new("v1");
    let base = BaseText::new().with_volume("v1", "abc");
    let mut compositor = LayerCompositor::new(base, TagRenderer);
    compositor.add_chars(&volume, 7, Placement::Before, "!");

    let err = compositor.render_volume(&volume).unwrap_err();
    assert_eq!(
        err,
        CompositionError::InsertionOutOfBounds {
            volume,
            coordinate: 7,
            len: 3,
        }
    );
}

#[test]
fn test_span_errors() {
    let base = BaseText::new().with_volume("v1", "abc");
    let compositor = LayerCompositor::new(base, TagRenderer);

    let err = compositor.render_work(&whole_volume("v1", 4)).unwrap_err();
    assert!(matches!(err, CompositionError::SpanOutOfBounds { end: 4, len: 3, .. }));

    let err = compositor.render_work(&whole_volume("v9", 1)).unwrap_err();
    assert_eq!(err, CompositionError::UnknownVolume(VolumeId::new("v9")));
}

#[test]
fn test_default_selection_is_lexicographic() {
    let source = MemorySource::new()
        .with_volume("v1", "ab")
        .with_layer("v1", Layer::new("Zeta", vec![Annotation::new(0, 0)]))
        .with_layer("v1", Layer::new("Alpha", vec![Annotation::new(0, 0)]))
        .with_work("w", vec![Span::new("v1", 0, 2)]);

    let all =
        LayerCompositor::compose(&source, "w", MarkerRenderer, &LayerSelection::All).unwrap();
    assert_eq!(all, "ZetaAlphaaalphazetab");

    let only = LayerSelection::Only(vec![LayerId::new("Zeta")]);
    let zeta = LayerCompositor::compose(&source, "w", MarkerRenderer, &only).unwrap();
    assert_eq!(zeta, "Zetaazetab");
}

#[test]
fn test_unsupported_layer_is_fatal() {
    let source = MemorySource::new()
        .with_volume("v1", "ab")
        .with_layer("v1", Layer::new("Unknown", vec![Annotation::new(0, 1)]))
        .with_work("w", vec![Span::new("v1", 0, 2)]);

    let err =
        LayerCompositor::compose(&source, "w", TagRenderer, &LayerSelection::All).unwrap_err();
    assert_eq!(err, CompositionError::UnsupportedLayer(LayerId::new("Unknown")));
}

#[test]
fn test_source_errors_surface() {
    let source = MemorySource::new().with_volume("v1", "ab");

    let err = LayerCompositor::compose(&source, "nope", TagRenderer, &LayerSelection::All)
        .unwrap_err();
    assert_eq!(
        err,
        CompositionError::Source(SourceError::UnknownWork("nope".to_string()))
    );

    let source = source.with_work("w", vec![Span::new("v1", 0, 2)]);
    let only = LayerSelection::Only(vec![LayerId::new("Missing")]);
    let err = LayerCompositor::compose(&source, "w", TagRenderer, &only).unwrap_err();
    assert!(matches!(
        err,
        CompositionError::Source(SourceError::MissingLayer { .. })
    ));
}

#[test]
fn test_untyped_annotation_is_rejected() {
    let base = BaseText::new().with_volume("v1", "ab");
    let mut compositor = LayerCompositor::new(base, TagRenderer);
    let err = compositor
        .apply_annotation(&VolumeId::new("v1"), &Annotation::new(0, 1))
        .unwrap_err();
    assert_eq!(err, CompositionError::UntypedAnnotation);
    assert!(compositor.insertions().is_empty());
}

#[test]
fn test_annotation_past_end_is_reported() {
    let volume = VolumeId::new("v1");
    let base = BaseText::new().with_volume("v1", "abc");
    let mut compositor = LayerCompositor::new(base, TagRenderer);

    // Ending exactly at the volume length is fine.
    compositor
        .apply_layer_data(&volume, Layer::new("q", vec![Annotation::new(1, 3)]))
        .unwrap();

    let err = compositor
        .apply_layer_data(&volume, Layer::new("q", vec![Annotation::new(1, 4)]))
        .unwrap_err();
    assert_eq!(
        err,
        CompositionError::AnnotationOutOfBounds {
            layer: LayerId::new("q"),
            volume: volume.clone(),
            start: 1,
            end: 4,
            len: 3,
        }
    );
    assert_eq!(compositor.render_volume(&volume).unwrap(), "a<q>bc</q>");
}

#[test]
fn test_inverted_annotation_is_reported() {
    let volume = VolumeId::new("v1");
    let base = BaseText::new().with_volume("v1", "abc");
    let mut compositor = LayerCompositor::new(base, TagRenderer);

    let err = compositor
        .apply_layer_data(&volume, Layer::new("q", vec![Annotation::new(2, 1)]))
        .unwrap_err();
    assert!(matches!(
        err,
        CompositionError::AnnotationOutOfBounds { start: 2, end: 1, .. }
    ));
    assert!(compositor.insertions().is_empty());
}

#[test]
fn test_annotation_on_unloaded_volume_is_reported() {
    let base = BaseText::new().with_volume("v1", "abc");
    let mut compositor = LayerCompositor::new(base, TagRenderer);

    let err = compositor
        .apply_layer_data(&VolumeId::new("v2"), Layer::new("q", vec![Annotation::new(0, 1)]))
        .unwrap_err();
    assert_eq!(err, CompositionError::UnknownVolume(VolumeId::new("v2")));
}
