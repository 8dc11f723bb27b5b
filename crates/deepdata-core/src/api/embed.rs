use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};

use crate::api::resolve_options;
use crate::codec::{Codec, MediaCodec};
use crate::media::{Media, Persist};
use crate::progress::{NoProgress, Progress};
use crate::{CodecOptions, DeepDataError, Method};

pub fn prepare() -> EmbedApi {
    EmbedApi::default()
}

#[derive(Debug)]
enum Payload {
    Bytes(Vec<u8>),
    File(PathBuf),
}

#[derive(Default)]
pub struct EmbedApi {
    payload: Option<Payload>,
    image: Option<PathBuf>,
    output: Option<PathBuf>,
    options: Option<CodecOptions>,
    progress: Option<Box<dyn Progress>>,
}

impl Debug for EmbedApi {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedApi")
            .field("payload", &self.payload)
            .field("image", &self.image)
            .field("output", &self.output)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl EmbedApi {
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Use the given options, or pick them from the carrier's extension on `None`
    pub fn use_options(mut self, options: Option<CodecOptions>) -> Self {
        self.options = options;
        self
    }

    /// Use the default options of `method`
    pub fn with_method(mut self, method: Method) -> Self {
        self.options = Some(method.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(Payload::Bytes(payload.into()));
        self
    }

    /// Hide the content of this file, it is read when executing
    pub fn with_payload_file<A: AsRef<Path>>(mut self, payload_file: A) -> Self {
        self.payload = Some(Payload::File(payload_file.as_ref().to_path_buf()));
        self
    }

    pub fn with_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Execute the embedding and block until the output file is written
    pub fn execute(self) -> Result<(), DeepDataError> {
        self.validate()?;
        let Some(image) = self.image else {
            return Err(DeepDataError::CarrierNotSet);
        };
        let Some(output) = self.output else {
            return Err(DeepDataError::TargetNotSet);
        };
        let payload = match self.payload {
            Some(Payload::Bytes(bytes)) => bytes,
            Some(Payload::File(file)) => std::fs::read(&file).map_err(|source| {
                log::error!("Error reading payload file {file:?}: {source}");
                DeepDataError::ReadError { source }
            })?,
            None => return Err(DeepDataError::MissingPayload),
        };

        let options = resolve_options(self.options, &image);
        let media = Media::from_file(&image, options.method())?;
        let mut progress = self.progress.unwrap_or_else(|| Box::new(NoProgress));

        let mut secret = Codec::from(options).embed_into(&media, &payload, progress.as_mut())?;
        secret.save_as(&output)?;
        log::info!(
            "hid {} bytes with {} in {output:?}",
            payload.len(),
            options.method()
        );

        Ok(())
    }

    fn validate(&self) -> Result<(), DeepDataError> {
        if self.payload.is_none() {
            return Err(DeepDataError::MissingPayload);
        }

        Ok(())
    }
}
