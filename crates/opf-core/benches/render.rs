use criterion::{Criterion, black_box, criterion_group, criterion_main};
use opf_core::{
    Annotation, AnnotationRenderer, BaseText, CompositionError, InsertionSink, Layer,
    LayerCompositor, Placement, VolumeId,
};

struct Pagination;

impl AnnotationRenderer for Pagination {
    fn apply_annotation(
        &self,
        annotation: &Annotation,
        sink: &mut InsertionSink<'_>,
    ) -> Result<(), CompositionError> {
        let page = annotation.field("page").unwrap_or("?");
        sink.add_chars(annotation.start, Placement::Before, format!("[{page}]\n"));
        Ok(())
    }
}

fn large_volume(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!("{i:06} ཀ་ཁ་ག་ང་། the quick brown fox jumps over the lazy dog\n"));
    }
    out
}

fn bench_render_paginated_volume(c: &mut Criterion) {
    let raw = large_volume(50_000);
    let volume = VolumeId::new("v1");
    let base = BaseText::new().with_volume("v1", &raw);
    let len = base.volume(&volume).map(|v| v.char_count()).unwrap_or(0);
    let annotations = (0..len)
        .step_by(1_000)
        .enumerate()
        .map(|(page, start)| Annotation::new(start, start).with_field("page", page.to_string()))
        .collect();

    let mut compositor = LayerCompositor::new(base, Pagination);
    compositor
        .apply_layer_data(&volume, Layer::new("Pagination", annotations))
        .unwrap();

    c.bench_function("render/50k_lines_paginated", |b| {
        b.iter(|| black_box(compositor.render_volume(black_box(&volume)).unwrap().len()))
    });
}

criterion_group!(benches, bench_render_paginated_volume);
criterion_main!(benches);
