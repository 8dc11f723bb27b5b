use std::fmt::{self, Debug, Formatter};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::api::resolve_options;
use crate::codec::{Codec, MediaCodec};
use crate::media::Media;
use crate::progress::{NoProgress, Progress};
use crate::{CodecOptions, DeepDataError, Method};

pub fn prepare() -> ExtractApi {
    ExtractApi::default()
}

#[derive(Default)]
pub struct ExtractApi {
    secret_media: Option<PathBuf>,
    output_file: Option<PathBuf>,
    options: Option<CodecOptions>,
    progress: Option<Box<dyn Progress>>,
}

impl Debug for ExtractApi {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractApi")
            .field("secret_media", &self.secret_media)
            .field("output_file", &self.output_file)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ExtractApi {
    /// Use the given codec options, they must match the ones used for embedding
    pub fn with_options(mut self, options: CodecOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn use_options(mut self, options: Option<CodecOptions>) -> Self {
        self.options = options;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.options = Some(method.into());
        self
    }

    /// This is the secret image that contains the data to be extracted
    pub fn from_secret_file(mut self, secret_image: impl AsRef<Path>) -> Self {
        self.secret_media = Some(secret_image.as_ref().to_path_buf());
        self
    }

    /// The recovered payload is written to this file
    pub fn into_output_file(mut self, output_file: impl AsRef<Path>) -> Self {
        self.output_file = Some(output_file.as_ref().to_path_buf());
        self
    }

    pub fn with_progress(mut self, progress: Box<dyn Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Recover the payload without touching the file system beyond reading the carrier
    pub fn extract_bytes(self) -> Result<Vec<u8>, DeepDataError> {
        let Some(secret_media) = self.secret_media else {
            return Err(DeepDataError::CarrierNotSet);
        };

        let options = resolve_options(self.options, &secret_media);
        let media = Media::from_file(&secret_media, options.method())?;
        let mut progress = self.progress.unwrap_or_else(|| Box::new(NoProgress));

        let payload = Codec::from(options).extract_from(&media, progress.as_mut())?;
        log::info!(
            "recovered {} bytes with {} from {secret_media:?}",
            payload.len(),
            options.method()
        );

        Ok(payload)
    }

    /// Execute the extraction and blocks until the payload is written
    pub fn execute(mut self) -> Result<(), DeepDataError> {
        let Some(output_file) = self.output_file.take() else {
            return Err(DeepDataError::TargetNotSet);
        };
        let payload = self.extract_bytes()?;

        let mut target = File::create(&output_file).map_err(|source| {
            log::error!("Error creating file {output_file:?}: {source}");
            DeepDataError::WriteError { source }
        })?;
        target
            .write_all(&payload)
            .map_err(|source| DeepDataError::WriteError { source })
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    use super::*;
    use crate::codec_options::{ColorChannels, QimOptions};

    fn secret_image(dir: &Path, options: CodecOptions, payload: &[u8]) -> PathBuf {
        let carrier = dir.join("carrier.png");
        let secret = dir.join("secret.png");
        RgbaImage::from_fn(48, 48, |x, y| Rgba([x as u8, y as u8, 77, 255]))
            .save(&carrier)
            .expect("Failed to write carrier");
        crate::api::embed::prepare()
            .with_options(options)
            .with_payload(payload)
            .with_image(&carrier)
            .with_output(&secret)
            .execute()
            .expect("Failed to hide payload");
        secret
    }

    #[test]
    fn illustrate_api_usage() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let secret = secret_image(temp_dir.path(), CodecOptions::default(), b"Hello, World!");

        crate::api::extract::prepare()
            .from_secret_file(&secret)
            .into_output_file(temp_dir.path().join("payload.txt"))
            .execute()
            .expect("Failed to extract payload from image");

        let payload = std::fs::read(temp_dir.path().join("payload.txt")).unwrap();
        assert_eq!(payload, b"Hello, World!");
    }

    #[test]
    fn should_extract_with_matching_options() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let options = CodecOptions::Qim(QimOptions::new(12, ColorChannels::R | ColorChannels::B).unwrap());
        let secret = secret_image(temp_dir.path(), options, b"qim");

        let payload = prepare()
            .with_options(options)
            .from_secret_file(&secret)
            .extract_bytes()
            .expect("Failed to extract payload");

        assert_eq!(payload, b"qim");
    }

    #[test]
    fn should_require_a_secret_file_and_a_target() {
        assert!(matches!(
            prepare().into_output_file("payload.bin").execute(),
            Err(DeepDataError::CarrierNotSet)
        ));
        assert!(matches!(
            prepare().from_secret_file("secret.png").execute(),
            Err(DeepDataError::TargetNotSet)
        ));
    }

    #[test]
    fn should_not_write_a_file_without_a_valid_frame() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let plain = temp_dir.path().join("plain.png");
        RgbaImage::from_pixel(16, 16, Rgba([255, 255, 255, 255]))
            .save(&plain)
            .expect("Failed to write carrier");
        let output = temp_dir.path().join("payload.bin");

        let result = prepare()
            .from_secret_file(&plain)
            .into_output_file(&output)
            .execute();

        assert!(matches!(result, Err(DeepDataError::CorruptFrame { .. })));
        assert!(!output.exists());
    }
}
