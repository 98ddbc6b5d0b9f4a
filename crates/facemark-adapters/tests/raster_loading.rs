//! Integration tests for loading images from disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use facemark_adapters::FsImageSource;
use facemark_core::{ImageSource, PipelineError};
use facemark_test_support::SyntheticImageBuilder;
use tempfile::TempDir;

fn write_fixture(name: &str, width: u32, height: u32) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    SyntheticImageBuilder::checkerboard(width, height, 2)
        .save(dir.path().join(name))
        .unwrap();
    dir
}

#[test]
fn test_load_png() {
    let dir = write_fixture("face.png", 8, 6);
    let path = dir.path().join("face.png");

    let image = FsImageSource::new()
        .load(path.to_str().unwrap())
        .expect("should load PNG");
    assert_eq!((image.width(), image.height()), (8, 6));
}

#[test]
fn test_load_jpeg() {
    let dir = write_fixture("face.jpg", 16, 16);

    let image = FsImageSource::with_root(dir.path())
        .load("face.jpg")
        .expect("should load JPEG");
    assert_eq!((image.width(), image.height()), (16, 16));
}

#[test]
fn test_format_sniffed_from_content() {
    let dir = write_fixture("face.png", 4, 4);
    std::fs::rename(dir.path().join("face.png"), dir.path().join("face.dat")).unwrap();

    let image = FsImageSource::with_root(dir.path()).load("face.dat").unwrap();
    assert_eq!(image.width(), 4);
}

#[test]
fn test_missing_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();

    let err = FsImageSource::with_root(dir.path())
        .load("nope.png")
        .unwrap_err();
    match err {
        PipelineError::SourceUnreadable { reference, .. } => assert_eq!(reference, "nope.png"),
        other => panic!("expected SourceUnreadable, got {other:?}"),
    }
}

#[test]
fn test_garbage_bytes_fail_to_decode() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.png"), b"definitely not a png").unwrap();

    let err = FsImageSource::with_root(dir.path())
        .load("broken.png")
        .unwrap_err();
    assert!(matches!(err, PipelineError::DecodeFailed { .. }));
}

#[test]
fn test_directory_reference_is_not_decodable_image() {
    let dir = tempfile::tempdir().unwrap();

    let err = FsImageSource::new()
        .load(dir.path().to_str().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::SourceUnreadable { .. } | PipelineError::DecodeFailed { .. }
    ));
}
