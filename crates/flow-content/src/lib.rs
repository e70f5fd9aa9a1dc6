//! Artifact content handling for flowsync
//!
//! A content bundle is the unpacked source tree of one designtime artifact,
//! always rooted at a `META-INF/MANIFEST.MF`. This crate packs and unpacks
//! bundles, reads their manifests, decides whether two bundles differ in a
//! way that matters, and rewrites cross-artifact references.

pub mod bundle;
pub mod diff;
pub mod error;
pub mod kind;
pub mod manifest;
pub mod rewrite;

pub use diff::{DiffResult, DiffRule, DiffRules, JsonDiff};
pub use error::{Error, Result};
pub use kind::ArtifactKind;
pub use manifest::Manifest;
pub use rewrite::ReferenceRewriter;
