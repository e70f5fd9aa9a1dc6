//! Shared test utilities for the flowsync workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`tenant`]: [`FakeTenant`], an in-memory management API
//! - [`bundle`]: [`BundleBuilder`] for artifact source trees
//! - [`git`]: git repository fixtures
//! - [`workspace`]: [`TestWorkspace`] with git repo, artifacts and work dirs

pub mod bundle;
pub mod git;
pub mod tenant;
pub mod workspace;

pub use bundle::BundleBuilder;
pub use tenant::{FakeTenant, RecordedRequest};
pub use workspace::TestWorkspace;
