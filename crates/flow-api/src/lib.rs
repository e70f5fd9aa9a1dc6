//! Remote management API client for flowsync
//!
//! Talks OData to the tenant's management API: designtime artifact
//! lifecycle, integration packages and runtime status. Requests go
//! through the [`HttpTransport`] trait; [`UreqTransport`] is the
//! production implementation.

pub mod auth;
pub mod client;
pub mod designtime;
pub mod error;
pub mod http;
pub mod model;
pub mod package;
pub mod runtime;
pub mod transport;

pub use auth::{Credentials, ServiceDetails};
pub use client::ApiClient;
pub use designtime::{DesigntimeArtifact, KindEndpoints, UpdateStrategy, next_patch_version};
pub use error::{Error, Result};
pub use http::UreqTransport;
pub use model::{Artifact, ArtifactStatus, Package, PackageDescriptor, PackageMode, RuntimeStatus};
pub use package::Packages;
pub use runtime::Runtime;
pub use transport::{HttpTransport, Method, Request, Response};
