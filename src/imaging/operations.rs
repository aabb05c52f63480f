//! The per-file transcoding pipeline: probe → normalize → plan → encode.

use std::borrow::Cow;

use super::encode::{Encoded, encode};
use super::error::Result;
use super::normalize::Normalizer;
use super::params::CompressionSettings;
use super::plan::plan;
use super::probe::{ProbedMetadata, probe};

/// Result of [`transcode`]: the encoded output and what the input looked like.
#[derive(Debug, Clone)]
pub struct Transcoded {
    pub source: ProbedMetadata,
    pub output: Encoded,
}

/// Run every stage for one buffer.
///
/// Normalized buffers are probed again so that planning works on the real
/// decoded dimensions. The encode target is always `settings.format`, never
/// the normalized intermediate.
pub fn transcode(
    buffer: &[u8],
    settings: &CompressionSettings,
    normalizer: &Normalizer,
) -> Result<Transcoded> {
    let source = probe(buffer)?;
    tracing::debug!(
        format = %source.format,
        width = source.width,
        height = source.height,
        "Probed input"
    );

    let normalized = normalizer.normalize(buffer, source.format, settings.quality)?;
    let probed = match &normalized {
        Cow::Borrowed(_) => source,
        Cow::Owned(bytes) => probe(bytes)?,
    };

    let target = plan(&probed, settings.resize);
    let output = encode(&normalized, target, settings.format, settings.quality)?;

    Ok(Transcoded { source, output })
}
