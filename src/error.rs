//! Error types for every fallible boundary of the crate.
//!
//! Only [`BatchError`] aborts a batch run. Everything else is either returned
//! to direct callers or logged and skipped by the pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// A mapping table that is not a permutation of the twelve turtle actions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("mapping must have 12 entries, got {len}")]
    WrongLength { len: usize },

    #[error("action {action} at position {index} is out of range 0..12")]
    ActionOutOfRange { index: usize, action: u8 },

    #[error("action {action} is assigned more than once")]
    RepeatedAction { action: u8 },
}

/// A dataset document that cannot be turned into a labeled tree.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("document root must be a labeled object")]
    NotAnObject,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures of the rendering surface.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot create a {width}x{height} rendering surface")]
    SurfaceInit { width: u32, height: u32 },

    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// Conditions that abort a whole batch run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Surface(#[from] RenderError),

    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write manifest {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration files that fail to load.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("mapping {name:?}: {source}")]
    Mapping {
        name: String,
        #[source]
        source: MappingError,
    },
}

/// Why a single walk produced no image. The batch logs it and moves on.
#[derive(Error, Debug)]
pub enum WalkSkip {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("nothing to draw ({points} usable points)")]
    NothingToDraw { points: usize },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
