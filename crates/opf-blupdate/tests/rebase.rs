use opf_blupdate::{BaseLayerUpdater, Boundary, UnresolvedBoundary, rebase_layer};
use opf_core::{Annotation, Layer};
use pretty_assertions::assert_eq;

#[test]
fn test_rebase_layer_moves_annotations() {
    let updater = BaseLayerUpdater::new("title one. body text.", "NEW title one. body text.");
    let layer = Layer::new(
        "BookTitle",
        vec![Annotation::new(0, 9).with_field("id", "t1")],
    );

    let report = rebase_layer(&updater, &layer);
    assert!(report.is_complete());
    assert_eq!(
        report.layer,
        Layer::new(
            "BookTitle",
            vec![Annotation::new(4, 13).with_field("id", "t1")],
        )
    );
}

#[test]
fn test_rebase_layer_reports_unresolved_boundaries() {
    let updater = BaseLayerUpdater::new("aaaaaaaaaaXbbbbbbbbbb", "zzzzzzzzzzzzzzzzzzzzz");
    let layer = Layer::new("Citation", vec![Annotation::new(10, 11)]);

    let report = rebase_layer(&updater, &layer);
    assert!(!report.is_complete());
    assert_eq!(
        report.unresolved,
        vec![
            UnresolvedBoundary {
                index: 0,
                boundary: Boundary::Start,
                coordinate: 10,
            },
            UnresolvedBoundary {
                index: 0,
                boundary: Boundary::End,
                coordinate: 11,
            },
        ]
    );
    assert_eq!(report.layer.annotations[0], Annotation::new(10, 11));
}
