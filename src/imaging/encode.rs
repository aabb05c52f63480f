//! Resize and compress to the requested output format.
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode | `image::load_from_memory` |
//! | Resize | `DynamicImage::resize_exact` (Lanczos3) to [`fit_inside`] dimensions |
//! | JPEG | `JpegEncoder::new_with_quality`, alpha flattened onto white |
//! | PNG | `PngEncoder` with `CompressionType::Best` + adaptive filtering |

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ExtendedColorType, ImageEncoder, Rgb, RgbImage};

use super::error::{ImagingError, Result};
use super::params::{OutputFormat, Quality, ResizeBounds};
use super::plan::fit_inside;

/// Encoded output plus the dimensions actually written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// Resize (if a target is given) and compress `buffer` to `format`.
pub fn encode(
    buffer: &[u8],
    target: Option<ResizeBounds>,
    format: OutputFormat,
    quality: Quality,
) -> Result<Encoded> {
    let decoded = image::load_from_memory(buffer).map_err(|e| ImagingError::Decode(e.to_string()))?;

    let image = match target {
        Some(bounds) => {
            let (w, h) = fit_inside((decoded.width(), decoded.height()), bounds);
            tracing::debug!(from_w = decoded.width(), from_h = decoded.height(), w, h, "Resizing");
            decoded.resize_exact(w, h, FilterType::Lanczos3)
        }
        None => decoded,
    };

    let bytes = match format {
        OutputFormat::Jpeg => encode_jpeg(&image, quality)?,
        OutputFormat::Png => encode_png(&image)?,
    };

    Ok(Encoded {
        bytes,
        format,
        width: image.width(),
        height: image.height(),
    })
}

/// Baseline JPEG at `quality`.
pub fn encode_jpeg(image: &DynamicImage, quality: Quality) -> Result<Vec<u8>> {
    let rgb = flatten(image);
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.value())
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Lossless PNG at maximum compression effort.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    // PNG has no float samples
    let image = match image.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => DynamicImage::ImageRgba16(image.to_rgba16()),
        _ => image.clone(),
    };

    let mut buf = Vec::new();
    PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive)
        .write_image(
            image.as_bytes(),
            image.width(),
            image.height(),
            image.color().into(),
        )
        .map_err(|e| ImagingError::Encode(e.to_string()))?;
    Ok(buf)
}

/// RGB8 with any alpha composited onto white.
fn flatten(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |c: u8| ((c as u16 * a as u16 + 255 * (255 - a as u16)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}
