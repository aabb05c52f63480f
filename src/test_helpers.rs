//! Shared fixtures for unit tests. Images are synthesised in memory.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::imaging::{HeifDecoder, ImagingError};
use crate::storage::{BlobStore, StorageError, UploadMetadata};

/// A noisy RGB gradient encoded as `format`.
pub fn encode_fixture(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 7 ^ y * 13) as u8,
            (x + y) as u8,
            (x * y % 251) as u8,
        ])
    });
    write(DynamicImage::ImageRgb8(img), format)
}

/// RGBA PNG whose left half is fully transparent.
pub fn encode_rgba_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        let alpha = if x < width / 2 { 0 } else { 255 };
        Rgba([200, 20, 20, alpha])
    });
    write(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

fn write(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Minimal HEIF-shaped container: an `ftyp` box with `brand` followed by a
/// bare `ispe` property. Enough for probing, not for a real decoder.
pub fn heif_fixture(brand: &[u8; 4], width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&24u32.to_be_bytes());
    bytes.extend_from_slice(b"ftyp");
    bytes.extend_from_slice(brand);
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(b"mif1");
    bytes.extend_from_slice(b"heic");

    bytes.extend_from_slice(&20u32.to_be_bytes());
    bytes.extend_from_slice(b"ispe");
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes
}

/// Stands in for libheif: returns a flat grey image of a fixed size.
pub struct FakeHeifDecoder {
    width: u32,
    height: u32,
}

impl FakeHeifDecoder {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl HeifDecoder for FakeHeifDecoder {
    fn decode(&self, _buffer: &[u8]) -> Result<DynamicImage, ImagingError> {
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            self.width,
            self.height,
            Rgb([128, 128, 128]),
        )))
    }
}

pub fn to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// In-memory [`BlobStore`] that records every write and can fail the n-th one.
#[derive(Default)]
pub struct RecordingStore {
    attempts: AtomicUsize,
    fail_on: Option<usize>,
    writes: Mutex<Vec<(String, Bytes, String)>>,
}

impl RecordingStore {
    /// Fails the write with zero-based position `attempt`.
    pub fn failing_on(attempt: usize) -> Self {
        Self {
            fail_on: Some(attempt),
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn content_types(&self) -> Vec<String> {
        let writes = self.writes.lock().unwrap();
        writes.iter().map(|(_, _, ct)| ct.clone()).collect()
    }

    pub fn bodies(&self) -> Vec<Bytes> {
        let writes = self.writes.lock().unwrap();
        writes.iter().map(|(_, body, _)| body.clone()).collect()
    }
}

#[async_trait]
impl BlobStore for RecordingStore {
    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<UploadMetadata, StorageError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_on == Some(attempt) {
            return Err(StorageError::UploadFailed(format!("{key}: injected failure")));
        }

        let size = body.len();
        self.writes
            .lock()
            .unwrap()
            .push((key.to_string(), body, content_type.to_string()));

        Ok(UploadMetadata {
            key: key.to_string(),
            etag: None,
            size,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("https://test-bucket.example.com/{key}")
    }
}
