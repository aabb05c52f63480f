//! Header-only format and dimension detection.

use image::{ImageFormat, ImageReader};
use std::fmt;
use std::io::Cursor;

use super::error::{ImagingError, Result};

/// ISO-BMFF brands that identify a HEIF/HEIC still image.
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"mif1", b"msf1",
];

/// Generic brands shared with AVIF; resolved by the compatible-brands list.
const GENERIC_BRANDS: &[&[u8; 4]] = &[b"mif1", b"msf1"];

/// Codec detected from the buffer contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    /// Anything the `image` crate recognises.
    Raster(ImageFormat),
    /// HEIC/HEIF from mobile cameras.
    Heif,
}

impl DetectedFormat {
    /// Acquisition formats that are never used as an encode input directly.
    pub fn is_camera_native(self) -> bool {
        matches!(self, DetectedFormat::Heif)
    }

    pub fn name(self) -> &'static str {
        match self {
            DetectedFormat::Heif => "heif",
            DetectedFormat::Raster(format) => format.extensions_str().first().copied().unwrap_or("unknown"),
        }
    }
}

impl fmt::Display for DetectedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format and dimensions of a single buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbedMetadata {
    pub format: DetectedFormat,
    pub width: u32,
    pub height: u32,
}

impl ProbedMetadata {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Inspect `buffer` and report its format and dimensions.
///
/// Only headers are read; pixel data is never decoded.
pub fn probe(buffer: &[u8]) -> Result<ProbedMetadata> {
    if buffer.is_empty() {
        return Err(ImagingError::Decode("empty buffer".to_string()));
    }

    if is_heif(buffer) {
        let (width, height) = heif_dimensions(buffer).ok_or_else(|| {
            ImagingError::Decode("HEIF container has no image extents".to_string())
        })?;
        return Ok(ProbedMetadata {
            format: DetectedFormat::Heif,
            width,
            height,
        });
    }

    let reader = ImageReader::new(Cursor::new(buffer))
        .with_guessed_format()
        .map_err(|e| ImagingError::Decode(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| ImagingError::Decode("unrecognized image format".to_string()))?;

    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| ImagingError::Decode(e.to_string()))?;

    Ok(ProbedMetadata {
        format: DetectedFormat::Raster(format),
        width,
        height,
    })
}

/// Checks the leading `ftyp` box for a HEIF brand.
fn is_heif(buffer: &[u8]) -> bool {
    if buffer.len() < 12 || &buffer[4..8] != b"ftyp" {
        return false;
    }

    let major = &buffer[8..12];
    if !HEIF_BRANDS.iter().any(|brand| major == &brand[..]) {
        return false;
    }

    if !GENERIC_BRANDS.iter().any(|brand| major == &brand[..]) {
        return true;
    }

    // mif1/msf1 are also used by AVIF; look at the compatible brands
    let box_len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    let end = box_len.min(buffer.len());
    let compatible = buffer.get(16..end).unwrap_or_default();
    !compatible
        .chunks_exact(4)
        .any(|brand| brand == b"avif" || brand == b"avis")
}

/// Largest `ispe` (image spatial extents) property in the container.
///
/// Grid images carry one `ispe` per tile plus one for the full canvas, so the
/// largest area is the primary image.
fn heif_dimensions(buffer: &[u8]) -> Option<(u32, u32)> {
    buffer
        .windows(4)
        .enumerate()
        .filter(|(_, window)| *window == b"ispe")
        .filter_map(|(offset, _)| {
            // type(4) + version/flags(4), then width and height
            let extents = buffer.get(offset + 8..offset + 16)?;
            let width = u32::from_be_bytes([extents[0], extents[1], extents[2], extents[3]]);
            let height = u32::from_be_bytes([extents[4], extents[5], extents[6], extents[7]]);
            (width > 0 && height > 0).then_some((width, height))
        })
        .max_by_key(|(width, height)| u64::from(*width) * u64::from(*height))
}
