use std::path::Path;

use clap::{Args, Parser, Subcommand};
use deepdata_core::codec_options::{
    ColorChannels, DctQimOptions, JpegComponents, LsbOptions, QimOptions, DEFAULT_DELTA,
    DEFAULT_STRENGTH, DEFAULT_WINDOW,
};
use deepdata_core::progress::{NoProgress, Progress};
use deepdata_core::{CodecOptions, Method};

use crate::commands::*;
use crate::progress_bar::ProgressBar;
use crate::CliResult;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Hides a data file in a PNG, BMP or JPEG carrier
    Embed(embed::EmbedArgs),
    /// Recovers hidden data into a file
    Extract(extract::ExtractArgs),
    /// Prints how many payload bytes a carrier can hold
    Capacity(capacity::CapacityArgs),
}

/// Method and options, shared by all commands
#[derive(Args, Debug, Default, Clone)]
pub struct Settings {
    /// Embedding method: lsb, qim or dct-qim [default: dct-qim for JPEG files, lsb otherwise]
    #[arg(long, global = true, value_name = "method")]
    pub method: Option<Method>,

    /// Quantization step for qim and dct-qim, 2 to 128 [default: 4]
    #[arg(long, global = true, value_name = "delta")]
    pub delta: Option<u8>,

    /// Low bits replaced per byte for lsb, 1 to 8 [default: 2]
    #[arg(long, global = true, value_name = "bits")]
    pub strength: Option<u8>,

    /// Channels for qim (R,G,B) or components for dct-qim (Y,Cb,Cr) [default: all]
    #[arg(long, global = true, value_name = "list")]
    pub channels: Option<String>,

    /// Zig-zag positions per block visited by dct-qim, 1 to 64 [default: 64]
    #[arg(long, global = true, value_name = "size")]
    pub window: Option<u8>,

    /// Do not draw a progress bar
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Settings {
    pub fn method_for(&self, carrier: &Path) -> Method {
        self.method.unwrap_or_else(|| Method::for_path(carrier))
    }

    /// Build validated options for `carrier`, warning about flags the method ignores.
    pub fn codec_options(&self, carrier: &Path) -> CliResult<CodecOptions> {
        let method = self.method_for(carrier);
        let ignored = |flag: &str, given: bool| {
            if given {
                log::warn!("--{flag} has no effect with {method}");
            }
        };

        Ok(match method {
            Method::Lsb => {
                ignored("delta", self.delta.is_some());
                ignored("channels", self.channels.is_some());
                ignored("window", self.window.is_some());
                CodecOptions::Lsb(LsbOptions::new(self.strength.unwrap_or(DEFAULT_STRENGTH))?)
            }
            Method::Qim => {
                ignored("strength", self.strength.is_some());
                ignored("window", self.window.is_some());
                let channels = match &self.channels {
                    Some(list) => list.parse::<ColorChannels>()?,
                    None => ColorChannels::ALL,
                };
                CodecOptions::Qim(QimOptions::new(
                    self.delta.unwrap_or(DEFAULT_DELTA),
                    channels,
                )?)
            }
            Method::DctQim => {
                ignored("strength", self.strength.is_some());
                let components = match &self.channels {
                    Some(list) => list.parse::<JpegComponents>()?,
                    None => JpegComponents::ALL,
                };
                CodecOptions::DctQim(DctQimOptions::new(
                    self.delta.unwrap_or(DEFAULT_DELTA),
                    components,
                    self.window.unwrap_or(DEFAULT_WINDOW),
                )?)
            }
        })
    }

    pub fn progress(&self) -> Box<dyn Progress> {
        if self.quiet {
            Box::new(NoProgress)
        } else {
            Box::new(ProgressBar::default())
        }
    }
}
