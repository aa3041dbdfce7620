use image::{ImageBuffer, ImageFormat, Rgb};
use slidekit_document::{ImageImporter, ImportError};
use std::io::Cursor;
use tempfile::TempDir;

fn encoded(format: ImageFormat) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(6, 3, Rgb([0, 128, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).expect("encode");
    out.into_inner()
}

#[test]
fn test_jpeg_is_accepted() {
    let imported = ImageImporter::new()
        .import_bytes(&encoded(ImageFormat::Jpeg))
        .expect("jpeg");
    assert_eq!(imported.mime_type(), "image/jpeg");
    assert_eq!((imported.width, imported.height), (6, 3));
}

#[test]
fn test_bmp_is_rejected() {
    let err = ImageImporter::new()
        .import_bytes(&encoded(ImageFormat::Bmp))
        .expect_err("bmp");
    assert!(matches!(err, ImportError::UnsupportedType(_)));
}

#[test]
fn test_truncated_png_fails_to_decode() {
    let mut bytes = encoded(ImageFormat::Png);
    bytes.truncate(bytes.len() / 2);
    let err = ImageImporter::new().import_bytes(&bytes).expect_err("truncated");
    assert!(matches!(err, ImportError::Decode(_)));
}

#[test]
fn test_import_file_checks_size_first() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("big.png");
    std::fs::write(&path, encoded(ImageFormat::Png)).expect("write");

    let err = ImageImporter::with_limit(8).import_file(&path).expect_err("too large");
    assert!(matches!(err, ImportError::TooLarge { limit: 8, .. }));

    let missing = ImageImporter::new().import_file(&dir.path().join("missing.png"));
    assert!(matches!(missing, Err(ImportError::Read(_))));
}
