//! Core domain models
//!
//! This module defines the fundamental data structures that represent
//! commands, stages, pipelines and the project configuration they are
//! built from.

pub mod command;
pub mod config;
pub mod manifest;
pub mod pipeline;
pub mod stage;
pub mod state;

pub use command::*;
pub use manifest::PackageManifest;
pub use pipeline::*;
pub use stage::*;
pub use state::*;
