use bytes::Bytes;

use super::error::BatchError;
use super::input::{FileInput, decode_payload};
use super::{BatchContext, UploadedFile};
use crate::imaging::{resolve, transcode};

/// Run one file through decode, transcode and upload.
pub(crate) async fn process_file(
    ctx: &BatchContext,
    username: Option<&str>,
    index: usize,
    input: FileInput,
) -> Result<UploadedFile, BatchError> {
    let FileInput {
        file_base64,
        file_name,
        mime_type,
        config,
    } = input;

    let settings = resolve(config.as_ref(), &ctx.defaults).map_err(|source| BatchError::Image {
        file_name: file_name.clone(),
        source,
    })?;

    let buffer = decode_payload(&file_base64).map_err(|source| BatchError::InvalidBase64 {
        file_name: file_name.clone(),
        source,
    })?;
    drop(file_base64);

    let normalizer = ctx.normalizer.clone();
    let transcoded =
        tokio::task::spawn_blocking(move || transcode(&buffer, &settings, &normalizer))
            .await
            .map_err(|source| BatchError::Join {
                file_name: file_name.clone(),
                source,
            })?
            .map_err(|source| BatchError::Image {
                file_name: file_name.clone(),
                source,
            })?;

    let output = transcoded.output;
    let key = ctx.keys.generate(username, &file_name);
    let content_type = match mime_type.trim() {
        "" => output.format.mime_type(),
        declared => declared,
    };

    let meta = ctx
        .store
        .put(&key, Bytes::from(output.bytes), content_type)
        .await
        .map_err(|source| BatchError::Storage {
            file_name: file_name.clone(),
            source,
        })?;

    tracing::info!(
        file_index = index,
        file_name = %file_name,
        key = %meta.key,
        size = meta.size,
        format = %output.format,
        width = output.width,
        height = output.height,
        "File compressed and uploaded"
    );

    Ok(UploadedFile {
        url: ctx.store.object_url(&meta.key),
        key: meta.key,
        file_name,
    })
}
