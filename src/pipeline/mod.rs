//! Batch orchestration
//!
//! [`process_batch`] fans the files of one request out over a bounded
//! [`JoinSet`], runs each through [`transcode`](crate::imaging::transcode)
//! and the [`BlobStore`], and reassembles the results in input order.
//!
//! Two failure policies exist:
//! - [`FailurePolicy::FailFast`]: the first failing file aborts everything
//!   still in flight and the whole batch fails. Files already uploaded stay
//!   in storage.
//! - [`FailurePolicy::Isolate`]: every file is attempted and failures are
//!   listed next to the uploads.

mod error;
mod input;
mod item;

pub use crate::config::FailurePolicy;
pub use error::BatchError;
pub use input::{BatchRequest, FileInput, decode_payload};

use bon::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::imaging::{CompressionSettings, Normalizer};
use crate::storage::{BlobStore, KeyGenerator};

/// Everything a batch needs besides its input
#[derive(Clone, Builder)]
pub struct BatchContext {
    pub store: Arc<dyn BlobStore>,
    #[builder(default)]
    pub keys: KeyGenerator,
    #[builder(default)]
    pub defaults: CompressionSettings,
    #[builder(default)]
    pub normalizer: Normalizer,
    /// Files in flight at once
    #[builder(default = 4)]
    pub concurrency: usize,
    #[builder(default)]
    pub policy: FailurePolicy,
}

impl BatchContext {
    pub fn from_config(config: &Config, store: Arc<dyn BlobStore>) -> Self {
        Self::builder()
            .store(store)
            .keys(KeyGenerator::new(config.storage.key_prefix.clone()))
            .defaults(config.compression.settings())
            .concurrency(config.batch.concurrency)
            .policy(config.batch.failure_policy)
            .build()
    }
}

/// Descriptor of one stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub file_name: String,
    pub key: String,
    pub url: String,
}

/// A file that failed under [`FailurePolicy::Isolate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedFile {
    pub index: usize,
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Successful files, in input order
    pub uploaded: Vec<UploadedFile>,
    /// Always empty under [`FailurePolicy::FailFast`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedFile>,
}

type Slot = Option<Result<UploadedFile, BatchError>>;

/// Process every file of `request`.
///
/// At most `ctx.concurrency` files are in flight. New files are started in
/// input order as earlier ones finish, so with a concurrency of 1 the batch
/// runs strictly sequentially.
pub async fn process_batch(
    ctx: &BatchContext,
    request: BatchRequest,
) -> Result<BatchOutcome, BatchError> {
    let BatchRequest { username, files } = request;
    if files.is_empty() {
        return Err(BatchError::NoFiles);
    }

    let total = files.len();
    let limit = ctx.concurrency.max(1);
    let names: Vec<String> = files.iter().map(|f| f.file_name.clone()).collect();
    let username: Option<Arc<str>> = username.map(Arc::from);

    tracing::info!(files = total, concurrency = limit, policy = ?ctx.policy, "Processing batch");

    let mut pending = files.into_iter().enumerate();
    let mut tasks = JoinSet::new();
    let mut owners = HashMap::new();
    let mut slots: Vec<Slot> = (0..total).map(|_| None).collect();

    loop {
        while tasks.len() < limit {
            let Some((index, input)) = pending.next() else {
                break;
            };
            let ctx = ctx.clone();
            let username = username.clone();
            let handle = tasks.spawn(async move {
                item::process_file(&ctx, username.as_deref(), index, input).await
            });
            owners.insert(handle.id(), index);
        }

        let Some(joined) = tasks.join_next_with_id().await else {
            break;
        };

        let (index, result) = match joined {
            Ok((id, result)) => match owners.remove(&id) {
                Some(index) => (index, result),
                None => continue,
            },
            Err(source) => match owners.remove(&source.id()) {
                Some(index) => {
                    let file_name = names[index].clone();
                    (index, Err(BatchError::Join { file_name, source }))
                }
                None => continue,
            },
        };

        if let Err(err) = &result {
            tracing::error!(
                file_index = index,
                file_name = %names[index],
                error = %err,
                "File failed"
            );
        }

        slots[index] = match result {
            Err(err) if ctx.policy == FailurePolicy::FailFast => {
                tasks.abort_all();
                return Err(err);
            }
            result => Some(result),
        };
    }

    let mut outcome = BatchOutcome::default();
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(Ok(uploaded)) => outcome.uploaded.push(uploaded),
            Some(Err(err)) => outcome.failed.push(FailedFile {
                index,
                file_name: names[index].clone(),
                error: err.to_string(),
            }),
            None => {}
        }
    }

    tracing::info!(
        uploaded = outcome.uploaded.len(),
        failed = outcome.failed.len(),
        "Batch finished"
    );

    Ok(outcome)
}
