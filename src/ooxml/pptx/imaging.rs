//! Image preparation for new picture and media shapes.
//!
//! Pictures are decoded as raster images first and as SVG second. Anything
//! taller or wider than the configured cap is scaled down before it is stored,
//! height first and then width, and re-encoded as PNG. SVG input is rasterized
//! to a PNG preview at its capped intrinsic size and kept alongside the vector
//! bytes.

use crate::common::{Error, Result};
use crate::ooxml::pptx::format::{ImageFormat, MediaType};
use crate::ooxml::pptx::media::MediaStream;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat as RasterFormat, Rgba, RgbaImage};
use std::io::Cursor;

/// An image ready to be placed on a slide.
#[derive(Debug)]
pub struct PreparedPicture {
    /// Raster content referenced by the picture's main blip
    pub raster: MediaStream,
    /// Original vector content, only for SVG input
    pub svg: Option<MediaStream>,
    /// Display width in pixels
    pub width: u32,
    /// Display height in pixels
    pub height: u32,
}

/// Decode `bytes` and cap its size at `max_size` pixels on each side.
///
/// Returns [`Error::DecodeFailure`] when the bytes are neither a raster image
/// nor an SVG document.
pub fn prepare_picture(bytes: &[u8], max_size: u32) -> Result<PreparedPicture> {
    if let Ok(img) = image::load_from_memory(bytes) {
        return prepare_raster(bytes, img, max_size);
    }

    try_svg(bytes, max_size)
        .ok_or_else(|| Error::DecodeFailure("Unable to decode image".to_string()))
}

#[cfg(feature = "svg")]
fn try_svg(bytes: &[u8], max_size: u32) -> Option<PreparedPicture> {
    match prepare_svg(bytes, max_size) {
        Ok(prepared) => Some(prepared),
        Err(e) => {
            tracing::debug!(error = %e, "bytes are not a usable SVG either");
            None
        },
    }
}

#[cfg(not(feature = "svg"))]
fn try_svg(_bytes: &[u8], _max_size: u32) -> Option<PreparedPicture> {
    None
}

fn prepare_raster(bytes: &[u8], img: DynamicImage, max_size: u32) -> Result<PreparedPicture> {
    let (width, height, resized) = cap_size(img.width(), img.height(), max_size);

    let raster = match ImageFormat::detect_from_bytes(bytes) {
        Some(format) if !resized && format != ImageFormat::Svg => {
            MediaStream::with_image_format(bytes.to_vec(), format)
        },
        _ => {
            let img = if resized {
                DynamicImage::ImageRgba8(image::imageops::resize(
                    &img,
                    width,
                    height,
                    FilterType::Lanczos3,
                ))
            } else {
                img
            };
            MediaStream::with_image_format(encode_png(&img)?, ImageFormat::Png)
        },
    };

    tracing::debug!(width, height, resized, mime = raster.mime(), "prepared raster picture");
    Ok(PreparedPicture {
        raster,
        svg: None,
        width,
        height,
    })
}

#[cfg(feature = "svg")]
fn prepare_svg(bytes: &[u8], max_size: u32) -> Result<PreparedPicture> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
        .map_err(|e| Error::DecodeFailure(format!("Failed to parse SVG: {}", e)))?;

    let size = tree.size();
    let (intrinsic_w, intrinsic_h) = (size.width(), size.height());
    let (width, height) = cap_size_f32(intrinsic_w, intrinsic_h, max_size);

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| Error::DecodeFailure("Failed to create pixmap".to_string()))?;
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / intrinsic_w,
        height as f32 / intrinsic_h,
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let png = pixmap
        .encode_png()
        .map_err(|e| Error::DecodeFailure(format!("Failed to encode PNG: {}", e)))?;

    tracing::debug!(width, height, "rasterized SVG picture");
    Ok(PreparedPicture {
        raster: MediaStream::with_image_format(png, ImageFormat::Png),
        svg: Some(MediaStream::with_image_format(bytes.to_vec(), ImageFormat::Svg)),
        width,
        height,
    })
}

/// Scale `(width, height)` down to `max_size`, height first.
///
/// The width check uses the already-shrunk width, so a tall and wide image
/// can be shrunk twice. Returns the new size and whether it changed.
pub fn cap_size(width: u32, height: u32, max_size: u32) -> (u32, u32, bool) {
    let (mut w, mut h) = (width, height);
    let mut resized = false;

    if h > max_size {
        h = max_size;
        w = (h as u64 * width as u64 / height as u64) as u32;
        resized = true;
    }
    if w > max_size {
        w = max_size;
        h = (w as u64 * height as u64 / width as u64) as u32;
        resized = true;
    }

    (w.max(1), h.max(1), resized)
}

#[cfg(feature = "svg")]
fn cap_size_f32(width: f32, height: f32, max_size: u32) -> (u32, u32) {
    let (mut w, mut h) = (width as u32, height as u32);
    if h > max_size {
        h = max_size;
        w = (h as f32 * width / height) as u32;
    }
    if w > max_size {
        w = max_size;
        h = (w as f32 * height / width) as u32;
    }
    (w.max(1), h.max(1))
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, RasterFormat::Png)?;
    Ok(buffer.into_inner())
}

/// Preview image shown in place of an audio or video clip.
///
/// A 64x64 grey tile with a white play triangle; video previews are darker.
pub fn media_placeholder_png(media_type: MediaType) -> Result<Vec<u8>> {
    const SIZE: u32 = 64;
    let background = match media_type {
        MediaType::Audio => Rgba([0x7F, 0x7F, 0x7F, 0xFF]),
        MediaType::Video => Rgba([0x40, 0x40, 0x40, 0xFF]),
    };
    let glyph = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);

    let img = RgbaImage::from_fn(SIZE, SIZE, |x, y| {
        // Triangle pointing right, spanning x in 22..46 and centred vertically
        let (x, y) = (x as i32, y as i32);
        let half = (x - 22) / 2;
        if (22..46).contains(&x) && (y - 32).abs() <= 12 - half {
            glyph
        } else {
            background
        }
    });
    encode_png(&DynamicImage::ImageRgba8(img))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_of_size(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        encode_png(&DynamicImage::ImageRgba8(img)).unwrap()
    }

    #[test]
    fn test_cap_size_height_then_width() {
        assert_eq!(cap_size(800, 400, 500), (500, 250, true));
        assert_eq!(cap_size(400, 800, 500), (250, 500, true));
        assert_eq!(cap_size(300, 200, 500), (300, 200, false));
        // Height shrinks first, then the still-too-wide width shrinks again
        assert_eq!(cap_size(2000, 1000, 500), (500, 250, true));
    }

    #[test]
    fn test_small_raster_keeps_original_bytes() {
        let bytes = png_of_size(20, 10);
        let prepared = prepare_picture(&bytes, 500).unwrap();
        assert_eq!(prepared.raster.bytes(), &bytes[..]);
        assert_eq!((prepared.width, prepared.height), (20, 10));
        assert!(prepared.svg.is_none());
    }

    #[test]
    fn test_large_raster_is_resized_to_png() {
        let bytes = png_of_size(800, 400);
        let prepared = prepare_picture(&bytes, 500).unwrap();
        assert_eq!((prepared.width, prepared.height), (500, 250));
        assert_eq!(prepared.raster.mime(), "image/png");

        let decoded = image::load_from_memory(prepared.raster.bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (500, 250));
    }

    #[test]
    fn test_garbage_is_decode_failure() {
        let err = prepare_picture(b"definitely not an image", 500).unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(msg) if msg == "Unable to decode image"));
    }

    #[cfg(feature = "svg")]
    #[test]
    fn test_svg_is_rasterized_and_kept() {
        let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1000" height="200"><rect width="1000" height="200" fill="red"/></svg>"#;
        let prepared = prepare_picture(svg, 500).unwrap();
        assert_eq!((prepared.width, prepared.height), (500, 100));
        assert_eq!(prepared.raster.mime(), "image/png");
        assert_eq!(prepared.svg.as_ref().unwrap().bytes(), &svg[..]);
    }

    #[test]
    fn test_placeholder_is_png() {
        let png = media_placeholder_png(MediaType::Audio).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 64);
    }
}
