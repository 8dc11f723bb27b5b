use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use deepdata_core::bit_stream::HEADER_BYTES;
use deepdata_core::Method;

use crate::cli::Settings;
use crate::commands::megabytes;
use crate::CliResult;

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Carrier image, PNG, BMP or JPEG, used readonly
    #[arg(
        short = 'i',
        long = "in",
        value_name = "media source file",
        required = true
    )]
    pub media: PathBuf,

    /// File to hide in the carrier
    #[arg(short = 'd', long = "data", value_name = "data file", required = true)]
    pub data_file: PathBuf,

    /// Final image will be stored as file [default: output_<carrier name>]
    #[arg(short = 'o', long = "out", value_name = "output image file")]
    pub write_to_file: Option<PathBuf>,
}

impl EmbedArgs {
    pub fn run(self, settings: &Settings) -> CliResult<()> {
        let options = settings.codec_options(&self.media)?;
        let output = self
            .write_to_file
            .clone()
            .unwrap_or_else(|| default_output(&self.media, options.method()));

        if !settings.quiet {
            let capacity = deepdata_core::commands::capacity(&self.media, Some(options))?;
            let data_size = fs::metadata(&self.data_file)
                .map_err(|source| deepdata_core::DeepDataError::ReadError { source })?
                .len() as usize;
            println!(
                "Source capacity: {:.2} MB",
                megabytes(capacity.saturating_sub(HEADER_BYTES))
            );
            println!("Data size: {:.2} MB", megabytes(data_size));
        }

        deepdata_core::commands::embed(
            &self.media,
            &output,
            &self.data_file,
            Some(options),
            settings.progress(),
        )?;

        if !settings.quiet {
            println!("Done. Output: {}", output.display());
        }
        Ok(())
    }
}

/// `output_<name>` next to the carrier. Pixel methods on a JPEG carrier
/// switch to PNG, as JPEG would discard the hidden bits.
fn default_output(media: &Path, method: Method) -> PathBuf {
    let name = media
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "carrier".to_string());
    let mut output = media.with_file_name(format!("output_{name}"));

    let is_jpeg = matches!(
        output
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("jpg" | "jpeg")
    );
    if is_jpeg && method != Method::DctQim {
        output.set_extension("png");
    }
    output
}
