use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions() {
    let img = decode_image(&png_bytes(3, 2, [10, 20, 30, 255])).unwrap();
    assert_eq!(img.width(), 3);
    assert_eq!(img.height(), 2);
    assert_eq!(img.to_rgba8().get_pixel(2, 1).0, [10, 20, 30, 255]);
}

#[test]
fn open_and_probe_report_decode_failures() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.png");
    std::fs::write(&good, png_bytes(4, 8, [0, 0, 0, 255])).unwrap();
    assert_eq!(probe_dimensions(&good).unwrap(), (4, 8));
    assert_eq!(open_image(&good).unwrap().height(), 8);

    let bad = dir.path().join("bad.png");
    std::fs::write(&bad, b"not an image").unwrap();
    assert!(matches!(
        open_image(&bad).unwrap_err(),
        DeckError::ImageDecode { .. }
    ));
    assert!(matches!(
        probe_dimensions(&bad).unwrap_err(),
        DeckError::ImageDecode { .. }
    ));
    assert!(probe_dimensions(&dir.path().join("missing.png")).is_err());
}

#[test]
fn write_png_round_trips_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
    write_png(&img, &path).unwrap();
    assert_eq!(open_image(&path).unwrap().to_rgba8(), img);
}

#[test]
fn demultiply_restores_straight_alpha() {
    let mut px = [64u8, 32, 0, 128, 10, 20, 30, 255, 5, 5, 5, 0];
    demultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[0..4], &[128, 64, 0, 128]);
    assert_eq!(&px[4..8], &[10, 20, 30, 255]);
    assert_eq!(&px[8..12], &[5, 5, 5, 0]);
}
