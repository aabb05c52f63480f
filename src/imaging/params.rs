//! Compression parameters and per-file config resolution.
//!
//! - [`OutputFormat`]: encode target (`jpeg`/`jpg` or `png`).
//! - [`Quality`]: lossy quality, clamped to 1..=100 on construction.
//!   [`resolve`] rejects values above 100 before they get here.
//! - [`ResizeBounds`]: maximum bounding box for a fit-inside resize.
//! - [`CompressionSettings`]: fully resolved settings for one file.
//! - [`CompressionOverrides`]: caller-supplied, possibly partial settings.
//!
//! [`resolve`] merges overrides onto defaults field by field.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ImagingError;

/// Encode target for the compressed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ImagingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            other => Err(ImagingError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality setting for lossy encoding (1-100). Ignored for PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(60)
    }
}

/// Maximum bounding box for a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResizeBounds {
    pub width: u32,
    pub height: u32,
}

impl ResizeBounds {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ResizeBounds {
    fn default() -> Self {
        Self::new(1280, 1280)
    }
}

/// Fully populated settings for a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    pub format: OutputFormat,
    pub quality: Quality,
    pub resize: Option<ResizeBounds>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
            resize: Some(ResizeBounds::default()),
        }
    }
}

/// Per-file `config` object as sent by the caller.
///
/// `format` stays a string so that an unknown value becomes an
/// [`ImagingError::UnsupportedFormat`] for that file instead of a request
/// parse failure. `resize` distinguishes "absent" (inherit) from `null`
/// (no resize).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CompressionOverrides {
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub quality: Option<u32>,
    #[serde(default, deserialize_with = "present")]
    pub resize: Option<Option<ResizeBounds>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Merge caller overrides onto the defaults, one field at a time.
pub fn resolve(
    overrides: Option<&CompressionOverrides>,
    defaults: &CompressionSettings,
) -> Result<CompressionSettings, ImagingError> {
    let Some(overrides) = overrides else {
        return Ok(*defaults);
    };

    let format = match overrides.format.as_deref() {
        Some(name) => name.parse()?,
        None => defaults.format,
    };

    let quality = match overrides.quality {
        Some(value) if value > 100 => return Err(ImagingError::InvalidQuality(value)),
        Some(value) => Quality::new(value),
        None => defaults.quality,
    };

    let resize = match overrides.resize {
        Some(Some(bounds)) if bounds.width == 0 || bounds.height == 0 => {
            return Err(ImagingError::InvalidResize {
                width: bounds.width,
                height: bounds.height,
            });
        }
        Some(resize) => resize,
        None => defaults.resize,
    };

    Ok(CompressionSettings {
        format,
        quality,
        resize,
    })
}
