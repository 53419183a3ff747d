use criterion::{Criterion, criterion_group, criterion_main};
use image::{DynamicImage, RgbImage};
use passport_core::{
    BoundingBox, Calibration, LandmarkSet, PassportVerifier, ReplayAnalyzer, Thresholds,
    VerifierBank, plan_crop,
};
use passport_utils::load_fixture_json;
use std::hint::black_box;

fn build_source_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(1200, 1200, |x, y| {
        let val = ((x + y) % 255) as u8;
        image::Rgb([val, 255u8.saturating_sub(val), val / 2 + 60])
    }))
}

fn frontal_landmarks() -> LandmarkSet {
    load_fixture_json("landmarks/frontal_neutral.json").expect("landmark fixture")
}

fn bench_bank(c: &mut Criterion) {
    let bank = VerifierBank::new(Calibration::default(), Thresholds::default());
    let landmarks = frontal_landmarks();

    c.bench_function("verifier_bank_first_failure", |b| {
        b.iter(|| {
            let outcome = bank.first_failure(black_box(&landmarks)).expect("schema");
            black_box(outcome);
        })
    });

    c.bench_function("verifier_bank_inspect", |b| {
        b.iter(|| {
            let reports = bank.inspect(black_box(&landmarks)).expect("schema");
            black_box(reports);
        })
    });
}

fn bench_plan(c: &mut Criterion) {
    let calibration = Calibration::default();
    let face = BoundingBox::new(311, 742, 688, 418);

    c.bench_function("plan_crop", |b| {
        b.iter(|| {
            let plan = plan_crop(1600, 1200, black_box(face), &calibration).expect("plan");
            black_box(plan);
        })
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let source = build_source_image();
    let replay = ReplayAnalyzer::new(
        vec![BoundingBox::new(300, 600, 597, 400)],
        vec![frontal_landmarks()],
    );
    let verifier = PassportVerifier::new(&replay, Calibration::default(), Thresholds::default());

    c.bench_function("verify_canonical_1200", |b| {
        b.iter(|| {
            let outcome = verifier.verify(black_box(&source)).expect("verify");
            black_box(outcome);
        })
    });
}

criterion_group!(benches, bench_bank, bench_plan, bench_pipeline);
criterion_main!(benches);
