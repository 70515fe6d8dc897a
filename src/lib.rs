//! Convert a Nozbe JSON export into Org mode outline documents.
//!
//! The pipeline is [`loader::Dataset::load`] (flat records → relational graph)
//! followed by [`render::Renderer`] (graph → Org nodes), driven by
//! [`convert::convert`].

pub mod attachment;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod loader;
pub mod logging;
pub mod model;
pub mod org;
pub mod render;
pub mod util;

pub use error::{ConvertError, Result};
