use std::path::PathBuf;

use clap::Args;

use crate::cli::Settings;
use crate::CliResult;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Source image that contains secret data
    #[arg(
        short = 'i',
        long = "in",
        value_name = "media source file",
        required = true
    )]
    pub media: PathBuf,

    /// Recovered data will be stored as this file
    #[arg(short = 'o', long = "out", value_name = "output file", required = true)]
    pub output_file: PathBuf,
}

impl ExtractArgs {
    pub fn run(self, settings: &Settings) -> CliResult<()> {
        let options = settings.codec_options(&self.media)?;
        deepdata_core::commands::extract(
            &self.media,
            &self.output_file,
            Some(options),
            settings.progress(),
        )?;

        if !settings.quiet {
            println!("Done. Output: {}", self.output_file.display());
        }
        Ok(())
    }
}
