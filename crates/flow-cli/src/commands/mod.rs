//! Command implementations for flow-cli

pub mod deploy;
pub mod sync;
pub mod update;

pub use deploy::run_deploy;
pub use sync::run_sync;
pub use update::{run_update_artifact, run_update_package};
