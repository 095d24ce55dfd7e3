use astro_assist_core::{GrayImage, SampleRegion, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use astro_assist_hfd::{measure, SignatureParams};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_frame() -> GrayImage {
    let mut img = GrayImage::filled(LOGICAL_WIDTH as usize, LOGICAL_HEIGHT as usize, 35);
    img.fill_disk(360, 240, 4, 250);
    img.fill_disk(360, 240, 2, 255);
    img
}

fn bench_measure(c: &mut Criterion) {
    let img = synthetic_frame();
    let view = img.view();
    let focus_region = SampleRegion::new(360, 240, 30);
    let checkpoint = SampleRegion::new(670, 240, 10);
    let focus_params = SignatureParams::default();
    let checkpoint_params = SignatureParams::checkpoint();

    c.bench_function("measure_focus_61x61", |b| {
        b.iter(|| measure(black_box(&view), black_box(&focus_region), &focus_params))
    });
    c.bench_function("measure_checkpoint_21x21", |b| {
        b.iter(|| measure(black_box(&view), black_box(&checkpoint), &checkpoint_params))
    });
}

criterion_group!(benches, bench_measure);
criterion_main!(benches);
