use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageBuffer, ImageEncoder, ImageFormat, Rgb};

pub const JPEG_QUALITY: u8 = 90;
pub const COMPRESSED_JPEG_QUALITY: u8 = 75;

fn decode(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, String> {
    image::load_from_memory_with_format(bytes, format)
        .map_err(|e| format!("image_decode_failed:{e}"))
}

fn encode_png(img: &DynamicImage, compression: CompressionType) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive);
    encoder
        .write_image(img.as_bytes(), img.width(), img.height(), img.color())
        .map_err(|e| format!("png_encode_failed:{e}"))?;
    Ok(buf)
}

/// JPEG has no alpha channel, so everything is flattened to RGB first.
fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, String> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| format!("jpeg_encode_failed:{e}"))?;
    Ok(buf)
}

pub fn png_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, String> {
    encode_jpeg(&decode(bytes, ImageFormat::Png)?, JPEG_QUALITY)
}

pub fn webp_to_png(bytes: &[u8]) -> Result<Vec<u8>, String> {
    encode_png(&decode(bytes, ImageFormat::WebP)?, CompressionType::Default)
}

pub fn optimize_png(bytes: &[u8]) -> Result<Vec<u8>, String> {
    encode_png(&decode(bytes, ImageFormat::Png)?, CompressionType::Best)
}

pub fn optimize_jpeg(bytes: &[u8]) -> Result<Vec<u8>, String> {
    encode_jpeg(&decode(bytes, ImageFormat::Jpeg)?, COMPRESSED_JPEG_QUALITY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasFormat {
    Png,
    Jpeg,
}

/// Plain white canvas standing in for a page capture.
pub fn blank_canvas(width: u32, height: u32, format: CanvasFormat) -> Result<Vec<u8>, String> {
    let canvas: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_pixel(width, height, Rgb([255, 255, 255]));
    let img = DynamicImage::ImageRgb8(canvas);
    match format {
        CanvasFormat::Png => encode_png(&img, CompressionType::Fast),
        CanvasFormat::Jpeg => encode_jpeg(&img, JPEG_QUALITY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample_png() -> Vec<u8> {
        let img = RgbaImage::from_fn(16, 8, |x, y| Rgba([(x * 16) as u8, (y * 32) as u8, 90, 200]));
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf)
            .write_image(img.as_raw(), 16, 8, image::ColorType::Rgba8)
            .unwrap();
        buf
    }

    #[test]
    fn png_converts_to_jpeg_with_same_dimensions() {
        let jpeg = png_to_jpeg(&sample_png()).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn optimized_png_round_trips_pixels() {
        let original = sample_png();
        let optimized = optimize_png(&original).unwrap();
        let a = image::load_from_memory(&original).unwrap().to_rgba8();
        let b = image::load_from_memory(&optimized).unwrap().to_rgba8();
        assert_eq!(a, b);
    }

    #[test]
    fn garbage_input_is_reported() {
        let err = webp_to_png(b"not an image").unwrap_err();
        assert!(err.starts_with("image_decode_failed:"));
    }

    #[test]
    fn canvas_has_requested_size() {
        let png = blank_canvas(120, 80, CanvasFormat::Png).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
        let jpeg = blank_canvas(12, 8, CanvasFormat::Jpeg).unwrap();
        assert_eq!(infer::get(&jpeg).map(|k| k.mime_type()), Some("image/jpeg"));
    }
}
