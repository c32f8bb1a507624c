use opf_core::{
    Annotation, CompositionError, Layer, LayerCompositor, LayerId, LayerSelection, MemorySource,
    Span,
};
use opf_serialize::{
    BOOK_TITLE, CITATION, MarkupRenderer, MarkupRule, PAGINATION, TSAWA, YIGCHUNG, escape_xml,
};
use pretty_assertions::assert_eq;

fn only(layers: &[&str]) -> LayerSelection {
    LayerSelection::Only(layers.iter().map(|l| LayerId::new(*l)).collect())
}

#[test]
fn test_markdown_output() {
    let source = MemorySource::new()
        .with_volume("v001", "\u{feff}Title\nBody text.")
        .with_layer("v001", Layer::new(BOOK_TITLE, vec![Annotation::new(0, 5)]))
        .with_layer(
            "v001",
            Layer::new(
                PAGINATION,
                vec![
                    Annotation::new(0, 6).with_field("page_index", "1a"),
                    Annotation::new(6, 16).with_field("page_index", "1b"),
                ],
            ),
        )
        .with_layer("v001", Layer::new(YIGCHUNG, vec![Annotation::new(11, 15)]))
        .with_work("W1", vec![Span::new("v001", 0, 16)]);

    let text = LayerCompositor::compose(
        &source,
        "W1",
        MarkupRenderer::markdown(),
        &only(&[PAGINATION, YIGCHUNG, BOOK_TITLE]),
    )
    .unwrap();
    assert_eq!(text, "# [1a] Title\n[1b] Body _text_.");
}

#[test]
fn test_tei_output_nests_and_escapes() {
    let source = MemorySource::new()
        .with_volume("v001", "abcdef")
        .with_layer("v001", Layer::new(TSAWA, vec![Annotation::new(0, 6)]))
        .with_layer("v001", Layer::new(YIGCHUNG, vec![Annotation::new(2, 4)]))
        .with_layer(
            "v001",
            Layer::new(
                PAGINATION,
                vec![Annotation::new(0, 0).with_field("page_index", "1<a>")],
            ),
        )
        .with_work("W1", vec![Span::new("v001", 0, 6)]);

    let text = LayerCompositor::compose(
        &source,
        "W1",
        MarkupRenderer::tei(),
        &only(&[YIGCHUNG, TSAWA, PAGINATION]),
    )
    .unwrap();
    assert_eq!(
        text,
        "<pb n=\"1&lt;a&gt;\"/><quote type=\"tsawa\">ab<note type=\"yigchung\">cd</note>ef</quote>"
    );
}

#[test]
fn test_layer_without_rule_is_a_configuration_error() {
    let source = MemorySource::new()
        .with_volume("v001", "abc")
        .with_layer("v001", Layer::new("Durchen", vec![Annotation::new(0, 1)]))
        .with_work("W1", vec![Span::new("v001", 0, 3)]);

    let err = LayerCompositor::compose(
        &source,
        "W1",
        MarkupRenderer::markdown(),
        &LayerSelection::All,
    )
    .unwrap_err();
    assert_eq!(err, CompositionError::UnsupportedLayer(LayerId::new("Durchen")));
}

#[test]
fn test_custom_rule_and_missing_payload() {
    let renderer = MarkupRenderer::new().with_rule("Note", MarkupRule::new("[{n}:", "]"));
    let source = MemorySource::new()
        .with_volume("v001", "abc")
        .with_layer(
            "v001",
            Layer::new("Note", vec![Annotation::new(1, 2).with_field("n", "7")]),
        )
        .with_work("W1", vec![Span::new("v001", 0, 3)]);

    let text =
        LayerCompositor::compose(&source, "W1", &renderer, &LayerSelection::All).unwrap();
    assert_eq!(text, "a[7:b]c");

    let source = source.with_layer("v001", Layer::new("Note", vec![Annotation::new(0, 1)]));
    let err =
        LayerCompositor::compose(&source, "W1", &renderer, &LayerSelection::All).unwrap_err();
    assert_eq!(
        err,
        CompositionError::MissingPayload {
            layer: LayerId::new("Note"),
            key: "n".to_string(),
        }
    );
}

#[test]
fn test_annotation_ending_past_volume_is_rejected() {
    let source = MemorySource::new()
        .with_volume("v001", "abc")
        .with_layer("v001", Layer::new(TSAWA, vec![Annotation::new(1, 4)]))
        .with_work("W1", vec![Span::new("v001", 0, 3)]);

    let err = LayerCompositor::compose(&source, "W1", MarkupRenderer::tei(), &LayerSelection::All)
        .unwrap_err();
    assert_eq!(
        err,
        CompositionError::AnnotationOutOfBounds {
            layer: LayerId::new(TSAWA),
            volume: "v001".into(),
            start: 1,
            end: 4,
            len: 3,
        }
    );
}

#[test]
fn test_citation_markdown_only_opens() {
    let source = MemorySource::new()
        .with_volume("v001", "said: ab")
        .with_layer("v001", Layer::new(CITATION, vec![Annotation::new(6, 8)]))
        .with_work("W1", vec![Span::new("v001", 0, 8)]);

    let text =
        LayerCompositor::compose(&source, "W1", MarkupRenderer::markdown(), &LayerSelection::All)
            .unwrap();
    assert_eq!(text, "said: > ab");

    let renderer = MarkupRenderer::markdown();
    let citation = renderer.rule(&LayerId::new(CITATION)).unwrap();
    assert!(citation.close.is_empty());
}

#[test]
fn test_escape_xml() {
    assert_eq!(escape_xml("plain"), "plain");
    assert_eq!(escape_xml("a & \"b\""), "a &amp; &quot;b&quot;");
}
