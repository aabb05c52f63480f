//! Image transcoding, built on the `image` crate.
//!
//! | Stage | Module | Crate / function |
//! |---|---|---|
//! | **Probe** | [`probe`] | `ImageReader::into_dimensions`, ISO-BMFF `ftyp`/`ispe` for HEIF |
//! | **Normalize** | [`normalize`] | [`HeifDecoder`] → baseline JPEG |
//! | **Plan** | [`plan`] | pure dimension math |
//! | **Encode** | [`encode`] | Lanczos3 resize, `JpegEncoder` / `PngEncoder` |
//!
//! [`transcode`] runs all four stages for a single buffer.

pub mod encode;
mod error;
pub mod normalize;
pub mod operations;
mod params;
pub mod plan;
pub mod probe;

pub use encode::Encoded;
pub use error::ImagingError;
pub use normalize::{HeifDecoder, Normalizer, UnavailableHeifDecoder, default_heif_decoder};
pub use operations::{Transcoded, transcode};
pub use params::{
    CompressionOverrides, CompressionSettings, OutputFormat, Quality, ResizeBounds, resolve,
};
pub use probe::{DetectedFormat, ProbedMetadata};
