//! Response bodies of the HTTP surface.
//!
//! `POST /uploads` answers with a [`BatchOutcome`]:
//!
//! ```json
//! {
//!   "uploaded": [
//!     { "fileName": "cat.jpg", "key": "uploads/alice-1714557600000-3f9a0c1e-cat.jpg", "url": "https://..." }
//!   ]
//! }
//! ```
//!
//! Errors use [`ErrorResponse`]: `{ "message": "No files provided" }` (400),
//! `{ "message": "Internal Server Error", "error": "..." }` (500).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::observability::MetricsSnapshot;

pub use crate::pipeline::{BatchOutcome, FailedFile, UploadedFile};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
    pub counters: MetricsSnapshot,
}
