//! Shared request plumbing for the endpoint groups

use std::sync::Arc;

use flow_content::ArtifactKind;

use crate::designtime::DesigntimeArtifact;
use crate::package::Packages;
use crate::runtime::Runtime;
use crate::transport::{HttpTransport, Request, Response, truncate};
use crate::{Error, Result};

/// Entry point to the management API.
///
/// Cheap to clone; clones share the underlying transport and its session.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    pub fn designtime(&self, kind: ArtifactKind) -> DesigntimeArtifact {
        DesigntimeArtifact::new(self.clone(), kind)
    }

    pub fn packages(&self) -> Packages {
        Packages::new(self.clone())
    }

    pub fn runtime(&self) -> Runtime {
        Runtime::new(self.clone())
    }

    pub(crate) fn send(&self, request: Request) -> Result<Response> {
        let method = request.method.as_str();
        let path = request.path.clone();
        tracing::debug!(method, path = %path, "Executing HTTP request");
        let response = self.transport.execute(request)?;
        tracing::debug!(method, path = %path, status = response.status, "HTTP response");
        Ok(response)
    }
}

/// Turn a non-2xx response into [`Error::Server`].
pub(crate) fn expect_success(response: Response, operation: &str) -> Result<Response> {
    if response.is_success() {
        return Ok(response);
    }
    let body = response.text();
    if !body.is_empty() {
        tracing::error!(operation, status = response.status, body = %truncate(&body, 2000), "Remote call failed");
    }
    Err(Error::Server {
        operation: operation.to_string(),
        status: response.status,
        body,
    })
}

/// Quote a value for use inside an OData key predicate.
///
/// Single quotes are doubled and anything outside the URL-safe set is
/// percent-encoded.
pub(crate) fn odata_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for byte in value.replace('\'', "''").bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'\'' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out.push('\'');
    out
}
