//! Annotation pipeline tests against mocked ports.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::cast_possible_truncation
)]

use std::time::Duration;

use facemark_core::domain::quantize_rgb565;
use facemark_core::error::DETECTOR_UNAVAILABLE_MESSAGE;
use facemark_core::overlay::CYAN;
use facemark_core::{
    AnnotationPipeline, BoundingBox, Detection, DetectorOptions, Landmark, LandmarkKind,
    LandmarkMode, PipelineError, PipelineEvent, RasterImage, RetryPolicy,
};
use facemark_core::Presenter;
use facemark_test_support::{
    MockDetectorFactory, MockImageSource, MockNotifier, MockPresenter, MockProgressSink,
    SyntheticImageBuilder,
};
use image::{DynamicImage, Rgb, Rgba, RgbaImage};

const GRAY: [u8; 3] = [128, 128, 128];

fn no_wait() -> RetryPolicy {
    RetryPolicy::new(2, Duration::ZERO)
}

fn gray_source() -> MockImageSource {
    MockImageSource::new().with_image("photo", SyntheticImageBuilder::uniform_rgb(100, 80, GRAY))
}

fn pipeline(
    source: MockImageSource,
    detectors: &MockDetectorFactory,
    notifier: &MockNotifier,
) -> AnnotationPipeline {
    AnnotationPipeline::new(
        Box::new(source),
        Box::new(detectors.clone()),
        Box::new(notifier.clone()),
    )
    .with_retry(no_wait())
}

fn face() -> Detection {
    Detection::new(BoundingBox::new(20.0, 20.0, 40.0, 30.0))
        .with_landmark(Landmark::new(LandmarkKind::LeftEye, 35.0, 30.0))
}

fn background() -> Rgb<u8> {
    quantize_rgb565(Rgb(GRAY))
}

fn cyan() -> Rgb<u8> {
    quantize_rgb565(CYAN)
}

#[test]
fn test_no_faces_yields_quantized_copy() {
    let source_image = SyntheticImageBuilder::horizontal_gradient(64, 16);
    let source = MockImageSource::new().with_image("ramp", source_image.clone());
    let detectors = MockDetectorFactory::operational();
    let notifier = MockNotifier::new();

    let canvas = pipeline(source, &detectors, &notifier).run("ramp").unwrap();

    assert_eq!(canvas, RasterImage::from_source(&source_image));
    let expected = quantize_rgb565(*source_image.to_rgb8().get_pixel(40, 3));
    assert_eq!(canvas.get_pixel(40, 3), expected);
    assert_eq!(detectors.release_count(), 1);
    assert!(notifier.messages().is_empty());
}

#[test]
fn test_face_is_outlined_and_marked() {
    let detectors = MockDetectorFactory::operational().with_detections(vec![face()]);
    let notifier = MockNotifier::new();

    let annotation = pipeline(gray_source(), &detectors, &notifier)
        .run_detailed("photo")
        .unwrap();
    let canvas = &annotation.canvas;

    assert_eq!(canvas.dimensions(), (100, 80));
    assert_eq!(annotation.detections, vec![face()]);

    // left edge, inside and outside the stroke band
    assert_eq!(canvas.get_pixel(17, 40), cyan());
    assert_eq!(canvas.get_pixel(21, 40), cyan());
    assert_eq!(canvas.get_pixel(16, 40), background());
    assert_eq!(canvas.get_pixel(22, 40), background());

    // landmark marker
    assert_eq!(canvas.get_pixel(35, 30), cyan());
    assert_eq!(canvas.get_pixel(45, 30), cyan());
    assert_eq!(canvas.get_pixel(46, 30), background());

    // untouched regions
    assert_eq!(canvas.get_pixel(50, 42), background());
    assert_eq!(canvas.get_pixel(90, 70), background());
    assert_eq!(canvas.get_pixel(0, 0), background());
}

#[test]
fn test_detector_recheck_succeeds() {
    let detectors = MockDetectorFactory::with_availability(&[false, true]);
    let notifier = MockNotifier::new();
    let progress = MockProgressSink::new();

    let canvas = pipeline(gray_source(), &detectors, &notifier)
        .with_progress(Box::new(progress.clone()))
        .run("photo");

    assert!(canvas.is_ok());
    assert_eq!(detectors.check_count(), 2);
    assert!(progress
        .events()
        .contains(&PipelineEvent::DetectorReady { attempts: 2 }));
    assert!(notifier.messages().is_empty());
}

#[test]
fn test_detector_unavailable_notifies_and_releases() {
    let detectors = MockDetectorFactory::unavailable();
    let notifier = MockNotifier::new();

    let err = pipeline(gray_source(), &detectors, &notifier)
        .run("photo")
        .unwrap_err();

    assert!(matches!(err, PipelineError::DetectorUnavailable { attempts: 2 }));
    assert_eq!(err.kind(), "detector_unavailable");
    assert_eq!(detectors.check_count(), 2);
    assert_eq!(detectors.detect_count(), 0);
    assert_eq!(detectors.release_count(), 1);
    assert_eq!(notifier.messages(), vec![DETECTOR_UNAVAILABLE_MESSAGE.to_string()]);
}

#[test]
fn test_unreadable_source_skips_detector() {
    let source = MockImageSource::new().with_unreadable("gone");
    let detectors = MockDetectorFactory::operational();
    let notifier = MockNotifier::new();

    let err = pipeline(source, &detectors, &notifier).run("gone").unwrap_err();

    assert!(matches!(
        err,
        PipelineError::SourceUnreadable { ref reference, .. } if reference == "gone"
    ));
    assert_eq!(detectors.create_count(), 0);
    assert_eq!(detectors.release_count(), 0);
    assert!(notifier.messages().is_empty());
}

#[test]
fn test_undecodable_source_skips_detector() {
    let source = MockImageSource::new().with_undecodable("garbage");
    let detectors = MockDetectorFactory::operational();
    let notifier = MockNotifier::new();

    let err = pipeline(source, &detectors, &notifier)
        .run("garbage")
        .unwrap_err();

    assert!(matches!(err, PipelineError::DecodeFailed { .. }));
    assert_eq!(detectors.create_count(), 0);
}

#[test]
fn test_detection_failure_still_releases() {
    let detectors = MockDetectorFactory::operational().failing_detection("backend crashed");
    let notifier = MockNotifier::new();
    let progress = MockProgressSink::new();

    let err = pipeline(gray_source(), &detectors, &notifier)
        .with_progress(Box::new(progress.clone()))
        .run("photo")
        .unwrap_err();

    assert!(matches!(err, PipelineError::DetectionFailed(_)));
    assert_eq!(detectors.release_count(), 1);
    assert_eq!(progress.failure(), Some("detection_failed"));
}

#[test]
fn test_draw_order_does_not_matter() {
    let left = Detection::new(BoundingBox::new(5.0, 5.0, 30.0, 30.0))
        .with_landmark(Landmark::new(LandmarkKind::NoseBase, 20.0, 20.0));
    let right = Detection::new(BoundingBox::new(60.0, 30.0, 30.0, 40.0))
        .with_landmark(Landmark::new(LandmarkKind::Mouth, 75.0, 60.0));
    let notifier = MockNotifier::new();

    let forward =
        MockDetectorFactory::operational().with_detections(vec![left.clone(), right.clone()]);
    let backward = MockDetectorFactory::operational().with_detections(vec![right, left]);

    let a = pipeline(gray_source(), &forward, &notifier).run("photo").unwrap();
    let b = pipeline(gray_source(), &backward, &notifier).run("photo").unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_landmark_coordinates_truncate() {
    let at = |x: f32, y: f32| {
        Detection::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0))
            .with_landmark(Landmark::new(LandmarkKind::RightEye, x, y))
    };
    let notifier = MockNotifier::new();

    let fractional = MockDetectorFactory::operational().with_detections(vec![at(40.7, 30.9)]);
    let whole = MockDetectorFactory::operational().with_detections(vec![at(40.0, 30.0)]);

    let a = pipeline(gray_source(), &fractional, &notifier).run("photo").unwrap();
    let b = pipeline(gray_source(), &whole, &notifier).run("photo").unwrap();

    assert_eq!(a, b);
    assert_eq!(a.get_pixel(50, 30), cyan());
    assert_eq!(a.get_pixel(51, 30), background());
}

#[test]
fn test_progress_events_in_stage_order() {
    let detectors = MockDetectorFactory::operational().with_detections(vec![face()]);
    let notifier = MockNotifier::new();
    let progress = MockProgressSink::new();

    pipeline(gray_source(), &detectors, &notifier)
        .with_progress(Box::new(progress.clone()))
        .run("photo")
        .unwrap();

    assert_eq!(
        progress.events(),
        vec![
            PipelineEvent::SourceLoaded {
                reference: "photo".to_string(),
                width: 100,
                height: 80,
            },
            PipelineEvent::DetectorReady { attempts: 1 },
            PipelineEvent::FacesDetected { count: 1 },
            PipelineEvent::Rendered,
        ]
    );
    assert_eq!(progress.failure(), None);
}

#[test]
fn test_detector_options_forwarded() {
    let detectors = MockDetectorFactory::operational();
    let notifier = MockNotifier::new();

    pipeline(gray_source(), &detectors, &notifier).run("photo").unwrap();
    assert_eq!(detectors.created_options(), vec![DetectorOptions::still_image()]);

    let bare = DetectorOptions {
        tracking: false,
        landmarks: LandmarkMode::None,
    };
    let detectors = MockDetectorFactory::operational();
    pipeline(gray_source(), &detectors, &notifier)
        .with_options(bare)
        .run("photo")
        .unwrap();
    assert_eq!(detectors.created_options(), vec![bare]);
}

#[test]
fn test_each_run_gets_a_fresh_detector() {
    let detectors = MockDetectorFactory::operational();
    let notifier = MockNotifier::new();
    let pipeline = pipeline(gray_source(), &detectors, &notifier);

    pipeline.run("photo").unwrap();
    pipeline.run("photo").unwrap();

    assert_eq!(detectors.create_count(), 2);
    assert_eq!(detectors.release_count(), 2);
}

#[test]
fn test_canvas_handed_to_presenter_by_caller() {
    let detectors = MockDetectorFactory::operational().with_detections(vec![face()]);
    let notifier = MockNotifier::new();
    let presenter = MockPresenter::new();

    let canvas = pipeline(gray_source(), &detectors, &notifier).run("photo").unwrap();
    assert!(presenter.presented().is_empty());

    presenter.present(&canvas).unwrap();
    assert_eq!(presenter.presented(), vec![(100, 80)]);
}

#[test]
fn test_detector_sees_source_not_canvas() {
    let source_image = SyntheticImageBuilder::uniform_rgba(32, 24, [200, 90, 30, 128]);
    let source = MockImageSource::new().with_image("translucent", source_image.clone());
    let detectors = MockDetectorFactory::operational();
    let notifier = MockNotifier::new();

    let canvas = pipeline(source, &detectors, &notifier)
        .run("translucent")
        .unwrap();

    let seen = detectors.last_image().expect("detector was called");
    assert_eq!(seen, source_image);
    assert_ne!(seen, canvas.into_dynamic());
}

#[test]
fn test_edge_crossing_shapes_only_paint_cyan() {
    let source_image = DynamicImage::ImageRgba8(RgbaImage::from_fn(50, 40, |x, y| {
        Rgba([(x * 5) as u8, (y * 6) as u8, 77, ((x + y) * 3) as u8])
    }));
    let source = MockImageSource::new().with_image("ramp", source_image.clone());
    let detection = Detection::new(BoundingBox::new(30.0, 25.0, 40.0, 30.0))
        .with_landmark(Landmark::new(LandmarkKind::RightEar, 49.9, -9.9))
        .with_landmark(Landmark::new(LandmarkKind::LeftEar, 2.1e9, -1e20));
    let detectors = MockDetectorFactory::operational().with_detections(vec![detection]);
    let notifier = MockNotifier::new();

    let canvas = pipeline(source, &detectors, &notifier).run("ramp").unwrap();
    let base = RasterImage::from_source(&source_image);

    assert_eq!(canvas.dimensions(), (50, 40));
    let mut painted = 0;
    for (x, y, pixel) in canvas.as_rgb().enumerate_pixels() {
        let before = base.get_pixel(x, y);
        assert!(
            *pixel == before || *pixel == cyan(),
            "pixel ({x}, {y}) is neither source nor overlay color"
        );
        if *pixel != before {
            painted += 1;
        }
    }
    assert!(painted > 0);
    // truncated marker at (49, -9) reaches down to row 1
    assert_eq!(canvas.get_pixel(49, 0), cyan());
}
