use std::path::PathBuf;

use clap::Args;
use deepdata_core::bit_stream::HEADER_BYTES;

use crate::cli::Settings;
use crate::commands::megabytes;
use crate::CliResult;

#[derive(Args, Debug)]
pub struct CapacityArgs {
    /// Carrier image to measure
    #[arg(
        short = 'i',
        long = "in",
        value_name = "media source file",
        required = true
    )]
    pub media: PathBuf,
}

impl CapacityArgs {
    pub fn run(self, settings: &Settings) -> CliResult<()> {
        let options = settings.codec_options(&self.media)?;
        let capacity = deepdata_core::commands::capacity(&self.media, Some(options))?;
        let usable = capacity.saturating_sub(HEADER_BYTES);

        println!(
            "{} ({}): {usable} bytes ({:.2} MB)",
            self.media.display(),
            options.method(),
            megabytes(usable)
        );
        Ok(())
    }
}
