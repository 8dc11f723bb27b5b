use std::path::Path;

use crate::progress::Progress;
use crate::{CodecOptions, DeepDataError};

pub fn embed(
    media: &Path,
    write_to_file: &Path,
    data_file: &Path,
    options: Option<CodecOptions>,
    progress: Box<dyn Progress>,
) -> Result<(), DeepDataError> {
    crate::api::embed::prepare()
        .use_options(options)
        .with_image(media)
        .with_output(write_to_file)
        .with_payload_file(data_file)
        .with_progress(progress)
        .execute()
}

pub fn extract(
    secret_media: &Path,
    destination: &Path,
    options: Option<CodecOptions>,
    progress: Box<dyn Progress>,
) -> Result<(), DeepDataError> {
    crate::api::extract::prepare()
        .use_options(options)
        .from_secret_file(secret_media)
        .into_output_file(destination)
        .with_progress(progress)
        .execute()
}

/// Capacity of `media` in bytes, the length header included
pub fn capacity(media: &Path, options: Option<CodecOptions>) -> Result<usize, DeepDataError> {
    crate::api::capacity::prepare()
        .use_options(options)
        .with_image(media)
        .execute()
}
