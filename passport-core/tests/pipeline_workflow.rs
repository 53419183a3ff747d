use std::collections::HashMap;

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba};
use passport_core::{
    BoundingBox, BoundsPolicy, Calibration, Check, FaceAnalyzer, LandmarkSet, PassportVerifier,
    PipelineError, Rejection, ReplayAnalyzer, SchemaError, Thresholds,
};
use passport_utils::load_fixture_json;

fn landmarks(name: &str) -> LandmarkSet {
    load_fixture_json(format!("landmarks/{name}.json")).expect("fixture")
}

fn gray(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([128, 128, 128])))
}

/// Face that maps to scale 1.0 with the crop inside a 1200x1200 photo.
const CENTRED: BoundingBox = BoundingBox::new(300, 600, 597, 400);

fn verifier(replay: &ReplayAnalyzer) -> PassportVerifier<&ReplayAnalyzer> {
    PassportVerifier::new(replay, Calibration::default(), Thresholds::default())
}

#[test]
fn frontal_face_is_accepted_at_canonical_size() {
    let replay = ReplayAnalyzer::new(vec![CENTRED], vec![landmarks("frontal_neutral")]);
    let outcome = verifier(&replay).verify(&gray(1200, 1200)).expect("verify");

    let image = outcome.into_image().expect("accepted");
    assert_eq!(image.dimensions(), (525, 675));
    assert_eq!(replay.locate_calls(), 1);
    assert_eq!(replay.extract_calls(), 1);
}

#[test]
fn face_count_gate_runs_first() {
    let none = ReplayAnalyzer::new(Vec::new(), vec![landmarks("frontal_neutral")]);
    let outcome = verifier(&none).verify(&gray(800, 800)).expect("verify");
    assert_eq!(outcome.rejection(), Some(Rejection::NoFace));
    assert_eq!(none.extract_calls(), 0);

    let two = ReplayAnalyzer::new(vec![CENTRED, CENTRED], vec![landmarks("frontal_neutral")]);
    let outcome = verifier(&two).verify(&gray(1200, 1200)).expect("verify");
    assert_eq!(outcome.rejection(), Some(Rejection::MultipleFaces { count: 2 }));
    assert_eq!(two.extract_calls(), 0);
}

#[test]
fn second_face_on_the_crop_is_rejected() {
    let sets: Vec<LandmarkSet> = load_fixture_json("landmarks/two_faces.json").expect("fixture");
    let replay = ReplayAnalyzer::new(vec![CENTRED], sets);
    let outcome = verifier(&replay).verify(&gray(1200, 1200)).expect("verify");
    assert_eq!(
        outcome.rejection(),
        Some(Rejection::PostCropMultipleFaces { count: 2 })
    );

    let replay = ReplayAnalyzer::new(vec![CENTRED], Vec::new());
    let outcome = verifier(&replay).verify(&gray(1200, 1200)).expect("verify");
    assert_eq!(outcome.rejection(), Some(Rejection::PostCropNoFace));
}

#[test]
fn small_face_is_rejected_without_resampling() {
    // 90px tall face needs 297 / 90 = 3.3x.
    let replay = ReplayAnalyzer::new(
        vec![BoundingBox::new(200, 360, 290, 280)],
        vec![landmarks("frontal_neutral")],
    );
    let outcome = verifier(&replay).verify(&gray(640, 480)).expect("verify");
    match outcome.rejection() {
        Some(Rejection::ExcessiveUpscale { scale }) => assert!((scale - 3.3).abs() < 1e-9),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(replay.extract_calls(), 0);
}

#[test]
fn canonical_photo_is_a_fixed_point() {
    // Face box already sized and placed for the canonical frame.
    let face = BoundingBox::new(227, 325, 524, 200);
    let replay = ReplayAnalyzer::new(vec![face], vec![landmarks("frontal_neutral")]);
    let source = gray(525, 675);
    let image = verifier(&replay)
        .verify_optional(&source)
        .expect("verify")
        .expect("accepted");
    assert_eq!(image.dimensions(), source.dimensions());
}

#[test]
fn failing_fixtures_name_the_failed_check() {
    for (fixture, check) in [
        ("turned_head", Check::NoseBridge),
        ("open_mouth", Check::LipClosure),
    ] {
        let replay = ReplayAnalyzer::new(vec![CENTRED], vec![landmarks(fixture)]);
        let outcome = verifier(&replay).verify(&gray(1200, 1200)).expect("verify");
        assert_eq!(
            outcome.rejection(),
            Some(Rejection::FailedCheck { check }),
            "fixture {fixture}"
        );
    }
}

#[test]
fn malformed_landmarks_abort_instead_of_rejecting() {
    let replay = ReplayAnalyzer::new(vec![CENTRED], vec![landmarks("malformed_nose_bridge")]);
    let err = verifier(&replay)
        .verify_optional(&gray(1200, 1200))
        .unwrap_err();
    match err {
        PipelineError::Schema(SchemaError::Cardinality {
            expected, found, ..
        }) => assert_eq!((expected, found), (4, 3)),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn reference_face_is_padded_when_allowed() {
    let fill = Rgba([255, 255, 255, 255]);
    let replay = ReplayAnalyzer::new(
        vec![BoundingBox::new(100, 300, 400, 100)],
        vec![landmarks("frontal_neutral")],
    );
    let source = gray(600, 800);

    let strict = verifier(&replay).verify(&source).expect("verify");
    assert!(matches!(
        strict.rejection(),
        Some(Rejection::CropOutOfBounds { .. })
    ));

    let padded = verifier(&replay)
        .with_bounds_policy(BoundsPolicy::Pad { fill })
        .verify(&source)
        .expect("verify")
        .into_image()
        .expect("accepted");
    assert_eq!(padded.dimensions(), (525, 675));
    assert_eq!(padded.get_pixel(0, 0), fill);
    assert_eq!(padded.get_pixel(262, 337), Rgba([128, 128, 128, 255]));
}

/// Serves detections keyed by the source image width.
struct ByWidth {
    faces: HashMap<u32, Vec<BoundingBox>>,
    landmarks: LandmarkSet,
}

impl FaceAnalyzer for ByWidth {
    fn locate_faces(&self, image: &DynamicImage) -> anyhow::Result<Vec<BoundingBox>> {
        Ok(self.faces.get(&image.width()).cloned().unwrap_or_default())
    }

    fn extract_landmarks(&self, _image: &DynamicImage) -> anyhow::Result<Vec<LandmarkSet>> {
        Ok(vec![self.landmarks.clone()])
    }
}

#[test]
fn batch_keeps_input_order() {
    let analyzer = ByWidth {
        faces: HashMap::from([
            (1200, vec![CENTRED]),
            (640, vec![BoundingBox::new(200, 360, 290, 280)]),
            (900, vec![CENTRED, CENTRED]),
        ]),
        landmarks: landmarks("frontal_neutral"),
    };
    let verifier = PassportVerifier::new(analyzer, Calibration::default(), Thresholds::default());
    let images = vec![
        gray(640, 480),
        gray(1200, 1200),
        gray(300, 300),
        gray(900, 900),
        gray(1200, 1200),
    ];

    let results = verifier.verify_batch(&images);
    assert_eq!(results.len(), images.len());
    let verdicts: Vec<_> = results
        .into_iter()
        .map(|r| r.expect("no faults").rejection())
        .collect();
    assert!(matches!(verdicts[0], Some(Rejection::ExcessiveUpscale { .. })));
    assert_eq!(verdicts[1], None);
    assert_eq!(verdicts[2], Some(Rejection::NoFace));
    assert_eq!(verdicts[3], Some(Rejection::MultipleFaces { count: 2 }));
    assert_eq!(verdicts[4], None);
}
