//! Core library for the `crunch` texture packer.
//!
//! - MaxRects bin packing (Best Short Side Fit) with optional 90° rotation
//! - Alpha trimming, premultiplication and deduplication of input bitmaps
//! - Incremental rebuilds driven by a platform-stable content hash
//! - XML, JSON and binary atlas manifests, with split-build stitching
//!
//! Quick example:
//! ```ignore
//! use crunch_core::{pack_atlas, BuildOutcome, Config};
//! # fn main() -> crunch_core::Result<()> {
//! let cfg = Config::builder()
//!     .out_dir("out")
//!     .name("atlas")
//!     .input("assets/sprites")
//!     .xml(true)
//!     .trim(true)
//!     .unique(true)
//!     .build();
//! match pack_atlas(&cfg)? {
//!     BuildOutcome::Packed => println!("packed"),
//!     BuildOutcome::Unchanged => {}
//! }
//! # Ok(()) }
//! ```

pub mod binary;
pub mod bitmap;
pub mod config;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod maxrects;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod timing;

pub use config::*;
pub use error::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
pub mod prelude {
    pub use crate::bitmap::Bitmap;
    pub use crate::config::{Config, ConfigBuilder, StringEncoding};
    pub use crate::error::{CrunchError, Result};
    pub use crate::maxrects::MaxRectsBin;
    pub use crate::model::{Placement, Rect};
    pub use crate::packer::Packer;
    pub use crate::pipeline::{pack_atlas, BuildOutcome};
}
