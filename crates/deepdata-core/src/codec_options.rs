use std::fmt::{self, Display, Formatter};
use std::ops::BitOr;
use std::path::Path;
use std::str::FromStr;

use crate::{DeepDataError, Result};

pub const DEFAULT_STRENGTH: u8 = 2;
pub const DEFAULT_DELTA: u8 = 4;
pub const DEFAULT_WINDOW: u8 = 64;

/// Embedding method, selects both the codec and the media representation
/// it works on.
///
/// - `Lsb` → raw RGBA bytes of a raster image
/// - `Qim` → pixels of a raster image
/// - `DctQim` → quantized DCT coefficients of a JPEG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Lsb,
    Qim,
    DctQim,
}

impl Method {
    /// JPEG carriers default to `dct-qim`, everything else to `lsb`.
    pub fn for_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jpg" | "jpeg") => Self::DctQim,
            _ => Self::Lsb,
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lsb => "lsb",
            Self::Qim => "qim",
            Self::DctQim => "dct-qim",
        })
    }
}

impl FromStr for Method {
    type Err = DeepDataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lsb" => Ok(Self::Lsb),
            "qim" => Ok(Self::Qim),
            "dct-qim" | "dctqim" => Ok(Self::DctQim),
            other => Err(DeepDataError::InvalidConfiguration(format!(
                "unknown method '{other}', expected one of lsb, qim, dct-qim"
            ))),
        }
    }
}

macro_rules! channel_mask {
    ($(#[$meta:meta])* $name:ident { $($flag:ident = $index:literal => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u8);

        impl $name {
            $(pub const $flag: Self = Self(1 << $index);)+
            pub const ALL: Self = Self(0 $(| 1 << $index)+);
            const LABELS: &'static [(usize, &'static str)] = &[$(($index, $label)),+];

            pub const fn empty() -> Self {
                Self(0)
            }

            pub fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn count(self) -> usize {
                self.0.count_ones() as usize
            }

            /// Whether the channel at position `index` takes part.
            pub fn includes(self, index: usize) -> bool {
                index < 8 && self.0 & (1 << index) != 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                let labels: Vec<&str> = Self::LABELS
                    .iter()
                    .filter(|(index, _)| self.includes(*index))
                    .map(|(_, label)| *label)
                    .collect();
                f.write_str(&labels.join(","))
            }
        }

        /// Parses comma separated labels, ignoring case and surrounding blanks.
        impl FromStr for $name {
            type Err = DeepDataError;

            fn from_str(s: &str) -> Result<Self> {
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .try_fold(Self::empty(), |mask, part| {
                        Self::LABELS
                            .iter()
                            .find(|(_, label)| label.eq_ignore_ascii_case(part))
                            .map(|(index, _)| Self(mask.0 | 1 << index))
                            .ok_or_else(|| {
                                DeepDataError::InvalidConfiguration(format!(
                                    "unknown channel '{part}', expected any of {}",
                                    Self::ALL
                                ))
                            })
                    })
            }
        }
    };
}

channel_mask! {
    /// Color channels of an RGBA pixel used by pixel-domain QIM.
    /// The position of a flag is the byte offset within the pixel.
    ColorChannels {
        R = 0 => "R",
        G = 1 => "G",
        B = 2 => "B",
    }
}

channel_mask! {
    /// JPEG components used by DCT-domain QIM, in frame order.
    JpegComponents {
        Y = 0 => "Y",
        CB = 1 => "Cb",
        CR = 2 => "Cr",
    }
}

fn validate_delta(delta: u8) -> Result<u8> {
    if !(2..=128).contains(&delta) {
        return Err(DeepDataError::InvalidConfiguration(format!(
            "delta must be within 2..=128, got {delta}"
        )));
    }
    Ok(delta)
}

/// Options for embedding into the low bits of raw bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsbOptions {
    strength: u8,
}

impl LsbOptions {
    /// `strength` is the number of low bits replaced in every byte, `1..=8`.
    pub fn new(strength: u8) -> Result<Self> {
        if !(1..=8).contains(&strength) {
            return Err(DeepDataError::InvalidConfiguration(format!(
                "strength must be within 1..=8, got {strength}"
            )));
        }
        Ok(Self { strength })
    }

    pub fn strength(&self) -> u8 {
        self.strength
    }

    /// The low `strength` bits of a byte.
    pub fn mask(&self) -> u8 {
        (((1u16) << self.strength) - 1) as u8
    }
}

impl Default for LsbOptions {
    fn default() -> Self {
        Self {
            strength: DEFAULT_STRENGTH,
        }
    }
}

/// Options for quantization index modulation on pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QimOptions {
    delta: u8,
    channels: ColorChannels,
}

impl QimOptions {
    pub fn new(delta: u8, channels: ColorChannels) -> Result<Self> {
        if channels.is_empty() {
            return Err(DeepDataError::InvalidConfiguration(
                "at least one color channel must be enabled".to_string(),
            ));
        }
        Ok(Self {
            delta: validate_delta(delta)?,
            channels,
        })
    }

    pub fn delta(&self) -> u8 {
        self.delta
    }

    pub fn channels(&self) -> ColorChannels {
        self.channels
    }
}

impl Default for QimOptions {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            channels: ColorChannels::ALL,
        }
    }
}

/// Options for quantization index modulation on JPEG DCT coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DctQimOptions {
    delta: u8,
    components: JpegComponents,
    window: u8,
}

impl DctQimOptions {
    /// `window` limits the zig-zag positions visited per block to `1..window`,
    /// so `64` covers every AC coefficient.
    pub fn new(delta: u8, components: JpegComponents, window: u8) -> Result<Self> {
        if components.is_empty() {
            return Err(DeepDataError::InvalidConfiguration(
                "at least one JPEG component must be enabled".to_string(),
            ));
        }
        if !(1..=64).contains(&window) {
            return Err(DeepDataError::InvalidConfiguration(format!(
                "coefficient window must be within 1..=64, got {window}"
            )));
        }
        if window == 1 {
            log::warn!("a coefficient window of 1 excludes every AC coefficient");
        }
        Ok(Self {
            delta: validate_delta(delta)?,
            components,
            window,
        })
    }

    pub fn delta(&self) -> u8 {
        self.delta
    }

    pub fn components(&self) -> JpegComponents {
        self.components
    }

    pub fn window(&self) -> u8 {
        self.window
    }
}

impl Default for DctQimOptions {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            components: JpegComponents::ALL,
            window: DEFAULT_WINDOW,
        }
    }
}

/// Codec configuration for embedding and extraction
///
/// The variant decides the method and therefore which media representation
/// the carrier is loaded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOptions {
    Lsb(LsbOptions),
    Qim(QimOptions),
    DctQim(DctQimOptions),
}

impl CodecOptions {
    pub fn method(&self) -> Method {
        match self {
            Self::Lsb(_) => Method::Lsb,
            Self::Qim(_) => Method::Qim,
            Self::DctQim(_) => Method::DctQim,
        }
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self::Lsb(LsbOptions::default())
    }
}

/// Default options of a method.
impl From<Method> for CodecOptions {
    fn from(method: Method) -> Self {
        match method {
            Method::Lsb => Self::Lsb(LsbOptions::default()),
            Method::Qim => Self::Qim(QimOptions::default()),
            Method::DctQim => Self::DctQim(DctQimOptions::default()),
        }
    }
}
