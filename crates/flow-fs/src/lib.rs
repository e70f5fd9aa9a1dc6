//! Filesystem primitives for flowsync
//!
//! Provides normalized path handling, atomic file writes and whole-tree
//! operations used when materializing artifact bundles on disk.

pub mod error;
pub mod io;
pub mod path;
pub mod tree;

pub use error::{Error, Result};
pub use path::NormalizedPath;
