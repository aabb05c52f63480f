use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid resize bounds {width}x{height}: both sides must be at least 1")]
    InvalidResize { width: u32, height: u32 },

    #[error("invalid quality {0}: must be at most 100")]
    InvalidQuality(u32),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("failed to decode image: HEIF input is not supported by this build")]
    HeifUnavailable,
}

pub type Result<T> = std::result::Result<T, ImagingError>;
