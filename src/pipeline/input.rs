use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::imaging::CompressionOverrides;

/// A batch as submitted by the caller
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub files: Vec<FileInput>,
}

/// One entry of `files`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInput {
    /// Base64 image, optionally prefixed with `data:...;base64,`
    pub file_base64: String,
    #[serde(default)]
    pub file_name: String,
    /// Declared by the caller, never checked against the bytes
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub config: Option<CompressionOverrides>,
}

const BASE64_MARKER: &str = ";base64,";

/// Decode a `fileBase64` value.
///
/// Everything up to the last `;base64,` is dropped, then ASCII whitespace.
pub fn decode_payload(raw: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let data = match raw.rfind(BASE64_MARKER) {
        Some(pos) => &raw[pos + BASE64_MARKER.len()..],
        None => raw,
    };

    if data.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact)
    } else {
        STANDARD.decode(data)
    }
}
