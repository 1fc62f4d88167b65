use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrunchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to load png: {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save png: {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("packing failed, could not fit bitmap: {name}")]
    PackingImpossible { name: String },
}

pub type Result<T> = std::result::Result<T, CrunchError>;
