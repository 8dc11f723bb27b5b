use std::path::{Path, PathBuf};

use crate::api::resolve_options;
use crate::codec::{Codec, MediaCodec};
use crate::media::Media;
use crate::{CodecOptions, DeepDataError, Method};

pub fn prepare() -> CapacityApi {
    CapacityApi::default()
}

#[derive(Default, Debug)]
pub struct CapacityApi {
    image: Option<PathBuf>,
    options: Option<CodecOptions>,
}

impl CapacityApi {
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

    pub fn with_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.image = Some(image.as_ref().to_path_buf());
        self
    }

    /// Capacity in bytes, the 4 byte length header included
    pub fn execute(self) -> Result<usize, DeepDataError> {
        let Some(image) = self.image else {
            return Err(DeepDataError::CarrierNotSet);
        };

        let options = resolve_options(self.options, &image);
        let media = Media::from_file(&image, options.method())?;

        Codec::from(options).capacity_of(&media)
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn should_measure_by_method() {
        let temp_dir = tempdir().expect("Failed to create temporary directory");
        let carrier = temp_dir.path().join("carrier.png");
        RgbaImage::from_pixel(40, 20, Rgba([1, 2, 3, 4]))
            .save(&carrier)
            .expect("Failed to write carrier");

        let lsb = prepare().with_image(&carrier).execute().unwrap();
        let qim = prepare()
            .with_image(&carrier)
            .with_method(Method::Qim)
            .execute()
            .unwrap();

        assert_eq!(lsb, 40 * 20 * 4 * 2 / 8);
        assert_eq!(qim, 40 * 20 / 8);
    }

    #[test]
    fn should_require_a_carrier() {
        assert!(matches!(
            prepare().execute(),
            Err(DeepDataError::CarrierNotSet)
        ));
    }
}
