//! Conversion of camera-native formats into an encodable intermediate.
//!
//! The `image` crate has no HEIF decoder, so decoding goes through the
//! [`HeifDecoder`] seam. With the `heif` feature enabled, [`LibHeifDecoder`]
//! is used; otherwise HEIF input fails with [`ImagingError::HeifUnavailable`].

use image::DynamicImage;
use std::borrow::Cow;
use std::sync::Arc;

use super::encode::encode_jpeg;
use super::error::{ImagingError, Result};
use super::params::Quality;
use super::probe::DetectedFormat;

/// Decodes a HEIF/HEIC container into pixels.
pub trait HeifDecoder: Send + Sync {
    fn decode(&self, buffer: &[u8]) -> Result<DynamicImage>;
}

/// Decoder used when no HEIF support is compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableHeifDecoder;

impl HeifDecoder for UnavailableHeifDecoder {
    fn decode(&self, _buffer: &[u8]) -> Result<DynamicImage> {
        Err(ImagingError::HeifUnavailable)
    }
}

#[cfg(feature = "heif")]
pub use libheif::LibHeifDecoder;

#[cfg(feature = "heif")]
mod libheif {
    use image::{DynamicImage, RgbImage};
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    use super::{HeifDecoder, pack_rows};
    use crate::imaging::error::{ImagingError, Result};

    /// HEIF decoding through the system libheif.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct LibHeifDecoder;

    impl HeifDecoder for LibHeifDecoder {
        fn decode(&self, buffer: &[u8]) -> Result<DynamicImage> {
            let decode_err = |e: libheif_rs::HeifError| ImagingError::Decode(e.to_string());

            let lib = LibHeif::new();
            let ctx = HeifContext::read_from_bytes(buffer).map_err(decode_err)?;
            let handle = ctx.primary_image_handle().map_err(decode_err)?;
            let decoded = lib
                .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
                .map_err(decode_err)?;

            let planes = decoded.planes();
            let plane = planes
                .interleaved
                .ok_or_else(|| ImagingError::Decode("HEIF image has no RGB plane".to_string()))?;

            let (width, height) = (plane.width, plane.height);
            let pixels = pack_rows(plane.data, plane.stride, width as usize * 3, height as usize)?;

            RgbImage::from_raw(width, height, pixels)
                .map(DynamicImage::ImageRgb8)
                .ok_or_else(|| ImagingError::Decode("HEIF plane size mismatch".to_string()))
        }
    }
}

/// Copies `height` rows of `row_bytes` out of a plane laid out with `stride`.
///
/// A plane that ends before the last full row is a decode error.
#[cfg_attr(not(feature = "heif"), allow(dead_code))]
fn pack_rows(data: &[u8], stride: usize, row_bytes: usize, height: usize) -> Result<Vec<u8>> {
    if stride < row_bytes {
        return Err(ImagingError::Decode(format!(
            "HEIF plane stride {stride} is shorter than a row of {row_bytes} bytes"
        )));
    }

    let mut pixels = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        let row = data
            .get(y * stride..)
            .and_then(|rest| rest.get(..row_bytes))
            .ok_or_else(|| ImagingError::Decode(format!("HEIF plane truncated at row {y}")))?;
        pixels.extend_from_slice(row);
    }
    Ok(pixels)
}

/// The best HEIF decoder this build offers.
pub fn default_heif_decoder() -> Arc<dyn HeifDecoder> {
    #[cfg(feature = "heif")]
    {
        Arc::new(LibHeifDecoder)
    }
    #[cfg(not(feature = "heif"))]
    {
        Arc::new(UnavailableHeifDecoder)
    }
}

/// Re-encodes camera-native input to baseline JPEG; passes everything else through.
#[derive(Clone)]
pub struct Normalizer {
    heif: Arc<dyn HeifDecoder>,
}

impl Normalizer {
    pub fn new(heif: Arc<dyn HeifDecoder>) -> Self {
        Self { heif }
    }

    pub fn normalize<'a>(
        &self,
        buffer: &'a [u8],
        format: DetectedFormat,
        quality: Quality,
    ) -> Result<Cow<'a, [u8]>> {
        if !format.is_camera_native() {
            return Ok(Cow::Borrowed(buffer));
        }

        tracing::info!(%format, "Converting HEIF to JPEG");
        let decoded = self.heif.decode(buffer)?;
        encode_jpeg(&decoded, quality).map(Cow::Owned)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(default_heif_decoder())
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::probe::probe;
    use crate::test_helpers::{FakeHeifDecoder, encode_fixture, heif_fixture};
    use image::ImageFormat;

    #[test]
    fn passes_through_standard_formats() {
        let bytes = encode_fixture(20, 20, ImageFormat::Png);
        let normalizer = Normalizer::new(Arc::new(UnavailableHeifDecoder));

        let out = normalizer
            .normalize(&bytes, DetectedFormat::Raster(ImageFormat::Png), Quality::default())
            .unwrap();

        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(out.as_ref(), bytes.as_slice());
    }

    #[test]
    fn converts_heif_to_jpeg() {
        let bytes = heif_fixture(b"heic", 48, 32);
        let normalizer = Normalizer::new(Arc::new(FakeHeifDecoder::new(48, 32)));

        let out = normalizer
            .normalize(&bytes, DetectedFormat::Heif, Quality::new(80))
            .unwrap();

        let probed = probe(&out).unwrap();
        assert_eq!(probed.format, DetectedFormat::Raster(ImageFormat::Jpeg));
        assert_eq!(probed.dimensions(), (48, 32));
    }

    #[test]
    fn heif_without_decoder_fails() {
        let bytes = heif_fixture(b"heic", 48, 32);
        let normalizer = Normalizer::new(Arc::new(UnavailableHeifDecoder));

        let err = normalizer
            .normalize(&bytes, DetectedFormat::Heif, Quality::default())
            .unwrap_err();
        assert!(matches!(err, ImagingError::HeifUnavailable));
    }

    #[test]
    fn pack_rows_drops_stride_padding() {
        // 2x2 RGB with 2 bytes of padding per row; the last row is unpadded
        let data = [1, 2, 3, 4, 5, 6, 0, 0, 7, 8, 9, 10, 11, 12];
        let pixels = pack_rows(&data, 8, 6, 2).unwrap();
        assert_eq!(pixels, [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn pack_rows_rejects_short_final_row() {
        let data = [1, 2, 3, 4, 5, 6, 0, 0, 7, 8, 9];
        let err = pack_rows(&data, 8, 6, 2).unwrap_err();
        assert!(matches!(err, ImagingError::Decode(msg) if msg.contains("row 1")));
    }

    #[test]
    fn pack_rows_rejects_stride_below_row_width() {
        let err = pack_rows(&[0; 12], 4, 6, 2).unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }

    #[cfg(feature = "heif")]
    mod with_libheif {
        use super::*;
        use libheif_rs::{
            Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif,
            RgbChroma,
        };

        /// Encodes a real HEIC with libheif. `None` when libheif ships without an HEVC encoder.
        fn encode_heic(width: u32, height: u32) -> Option<Vec<u8>> {
            let lib = LibHeif::new();
            let mut encoder = lib.encoder_for_format(CompressionFormat::Hevc).ok()?;
            encoder.set_quality(EncoderQuality::Lossy(90)).unwrap();

            let mut image = Image::new(width, height, ColorSpace::Rgb(RgbChroma::C444)).unwrap();
            for channel in [Channel::R, Channel::G, Channel::B] {
                image.create_plane(channel, width, height, 8).unwrap();
            }
            let planes = image.planes_mut();
            for (plane, value) in [(planes.r, 200u8), (planes.g, 40), (planes.b, 90)] {
                let plane = plane.unwrap();
                let stride = plane.stride;
                for y in 0..height as usize {
                    plane.data[y * stride..y * stride + width as usize].fill(value);
                }
            }

            let mut ctx = HeifContext::new().unwrap();
            ctx.encode_image(&image, &mut encoder, None).unwrap();
            Some(ctx.write_to_bytes().unwrap())
        }

        #[test]
        fn libheif_decodes_real_heic() {
            let Some(bytes) = encode_heic(64, 48) else {
                eprintln!("libheif has no HEVC encoder; skipping");
                return;
            };

            let probed = probe(&bytes).unwrap();
            assert_eq!(probed.format, DetectedFormat::Heif);

            let decoded = LibHeifDecoder.decode(&bytes).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (64, 48));

            let out = Normalizer::new(Arc::new(LibHeifDecoder))
                .normalize(&bytes, DetectedFormat::Heif, Quality::new(80))
                .unwrap();
            let probed = probe(&out).unwrap();
            assert_eq!(probed.format, DetectedFormat::Raster(ImageFormat::Jpeg));
            assert_eq!(probed.dimensions(), (64, 48));
        }

        #[test]
        fn libheif_rejects_truncated_container() {
            let bytes = heif_fixture(b"heic", 48, 32);
            let err = LibHeifDecoder.decode(&bytes).unwrap_err();
            assert!(matches!(err, ImagingError::Decode(_)));
        }
    }
}
