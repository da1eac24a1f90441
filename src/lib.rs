//! # data-walker
//!
//! Turns base-12 symbol streams derived from real-world datasets into 3D
//! turtle walks, and renders those walks into gallery thumbnails.
//!
//! Two pipelines share the [`Renderer`] and the decimation helpers:
//! - **Symbols**: a [`Mapping`] assigns each symbol one of twelve turtle
//!   actions and [`walk`] replays the stream into a [`WalkPath`].
//!   [`RerenderJob`] re-derives many walks for a new mapping, cooperatively.
//! - **Points**: [`extract_walks`] pulls precomputed paths out of dataset
//!   documents and [`run_batch`] renders them and records a [`Manifest`].

pub mod batch;
pub mod config;
pub mod dataset;
pub mod downsample;
pub mod error;
pub mod extract;
pub mod interactive;
pub mod manifest;
pub mod mapping;
pub mod point;
pub mod render;
pub mod turtle;
pub mod walk;

pub use batch::*;
pub use config::*;
pub use dataset::*;
pub use downsample::*;
pub use error::*;
pub use extract::*;
pub use interactive::*;
pub use manifest::*;
pub use mapping::*;
pub use point::*;
pub use render::*;
pub use turtle::*;
pub use walk::*;
