use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Page edges the packer accepts; every page is square with one of these sides.
pub const PAGE_SIZES: [u32; 7] = [64, 128, 256, 512, 1024, 2048, 4096];

/// Maximum padding between packed images, in pixels.
pub const MAX_PAD: u32 = 16;

/// String encodings understood by the binary manifest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StringEncoding {
    /// Raw bytes followed by a single `0x00`.
    NullTerminated,
    /// Little-endian int16 byte length, then the bytes.
    LengthPrefixed,
    /// 7-bits-per-byte variable-length prefix (the .NET `BinaryWriter`
    /// convention: high bit set on every byte except the last).
    SevenBitPrefixed,
}

impl StringEncoding {
    /// Identifier stored in the binary manifest header.
    pub fn wire_id(self) -> u8 {
        match self {
            StringEncoding::NullTerminated => 0,
            StringEncoding::LengthPrefixed => 1,
            StringEncoding::SevenBitPrefixed => 2,
        }
    }
}

impl FromStr for StringEncoding {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "null" => Ok(Self::NullTerminated),
            "p" | "prefixed" => Ok(Self::LengthPrefixed),
            "7" | "7bit" => Ok(Self::SevenBitPrefixed),
            _ => Err(()),
        }
    }
}

/// The full options bag for one build, effectively immutable after argument
/// parsing. Passed by reference through the whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory output files are written into.
    pub out_dir: PathBuf,
    /// Atlas base name (`<name>0.png`, `<name>.xml`, ...).
    pub name: String,
    /// Input directories and individual `.png` files.
    pub inputs: Vec<PathBuf>,

    /// Emit an XML manifest.
    pub xml: bool,
    /// Emit a binary manifest.
    pub binary: bool,
    /// Emit a JSON manifest.
    pub json: bool,
    /// Multiply RGB by alpha when loading.
    pub premultiply: bool,
    /// Trim transparent borders and record frame metadata.
    pub trim: bool,
    /// Trace progress to stdout.
    pub verbose: bool,
    /// Repack even when the stored hash matches.
    pub force: bool,
    /// Fold byte-identical bitmaps into a single packed copy.
    pub unique: bool,
    /// Allow 90 degree clockwise rotation while packing.
    pub rotate: bool,

    /// Max page edge; one of [`PAGE_SIZES`].
    pub size: u32,
    /// Padding between images, `0..=16`.
    pub pad: u32,
    /// String encoding used by the binary manifest.
    pub binstr: StringEncoding,
    /// Hash inputs by mtime instead of file contents.
    pub check_time: bool,
    /// Build each immediate subdirectory independently and stitch manifests.
    pub split: bool,
    /// Drop the trailing `0` from the page name when there is one page.
    pub nozero: bool,

    /// Raw invocation tokens, folded into the change-detection hash.
    pub args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            name: String::new(),
            inputs: Vec::new(),
            xml: false,
            binary: false,
            json: false,
            premultiply: false,
            trim: false,
            verbose: false,
            force: false,
            unique: false,
            rotate: false,
            size: 4096,
            pad: 1,
            binstr: StringEncoding::NullTerminated,
            check_time: false,
            split: false,
            nozero: false,
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Validates option ranges and required fields.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::CrunchError;

        if self.name.is_empty() {
            return Err(CrunchError::InvalidConfig(
                "output name must not be empty".into(),
            ));
        }
        if self.inputs.is_empty() {
            return Err(CrunchError::InvalidConfig(
                "at least one input file or directory is required".into(),
            ));
        }
        if !PAGE_SIZES.contains(&self.size) {
            return Err(CrunchError::InvalidConfig(format!(
                "invalid size: {} (expected one of {:?})",
                self.size, PAGE_SIZES
            )));
        }
        if self.pad > MAX_PAD {
            return Err(CrunchError::InvalidConfig(format!(
                "invalid padding value: {} (expected 0..={})",
                self.pad, MAX_PAD
            )));
        }
        Ok(())
    }

    /// Create a fluent builder for `Config`.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`Config`] for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    cfg: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: Config::default(),
        }
    }
    pub fn out_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.out_dir = v.into();
        self
    }
    pub fn name(mut self, v: impl Into<String>) -> Self {
        self.cfg.name = v.into();
        self
    }
    pub fn input(mut self, v: impl Into<PathBuf>) -> Self {
        self.cfg.inputs.push(v.into());
        self
    }
    pub fn xml(mut self, v: bool) -> Self {
        self.cfg.xml = v;
        self
    }
    pub fn binary(mut self, v: bool) -> Self {
        self.cfg.binary = v;
        self
    }
    pub fn json(mut self, v: bool) -> Self {
        self.cfg.json = v;
        self
    }
    pub fn premultiply(mut self, v: bool) -> Self {
        self.cfg.premultiply = v;
        self
    }
    pub fn trim(mut self, v: bool) -> Self {
        self.cfg.trim = v;
        self
    }
    pub fn verbose(mut self, v: bool) -> Self {
        self.cfg.verbose = v;
        self
    }
    pub fn force(mut self, v: bool) -> Self {
        self.cfg.force = v;
        self
    }
    pub fn unique(mut self, v: bool) -> Self {
        self.cfg.unique = v;
        self
    }
    pub fn rotate(mut self, v: bool) -> Self {
        self.cfg.rotate = v;
        self
    }
    pub fn size(mut self, v: u32) -> Self {
        self.cfg.size = v;
        self
    }
    pub fn pad(mut self, v: u32) -> Self {
        self.cfg.pad = v;
        self
    }
    pub fn binstr(mut self, v: StringEncoding) -> Self {
        self.cfg.binstr = v;
        self
    }
    pub fn check_time(mut self, v: bool) -> Self {
        self.cfg.check_time = v;
        self
    }
    pub fn split(mut self, v: bool) -> Self {
        self.cfg.split = v;
        self
    }
    pub fn nozero(mut self, v: bool) -> Self {
        self.cfg.nozero = v;
        self
    }
    pub fn args(mut self, v: Vec<String>) -> Self {
        self.cfg.args = v;
        self
    }
    pub fn build(self) -> Config {
        self.cfg
    }
}
