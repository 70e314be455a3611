use std::io::Cursor;

use super::*;

fn encode(img: image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

#[test]
fn png_alpha_is_premultiplied() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100u8, 50, 200, 128]).unwrap();
    let prepared = decode_image(&encode(
        image::DynamicImage::ImageRgba8(img),
        image::ImageFormat::Png,
    ))
    .unwrap();
    assert_eq!((prepared.width, prepared.height), (1, 1));
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn jpeg_photo_is_opaque() {
    let img = image::RgbImage::from_pixel(8, 4, image::Rgb([10, 20, 30]));
    let prepared = decode_image(&encode(
        image::DynamicImage::ImageRgb8(img),
        image::ImageFormat::Jpeg,
    ))
    .unwrap();
    assert_eq!((prepared.width, prepared.height), (8, 4));
    assert_eq!(prepared.rgba8_premul.len(), 8 * 4 * 4);
    assert!(prepared.rgba8_premul.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn missing_and_garbage_files_fail() {
    let err = load_image(Path::new("/nonexistent/refcard/photo.jpg")).unwrap_err();
    assert!(err.to_string().contains("read image"));
    assert!(decode_image(b"not an image").is_err());
}
