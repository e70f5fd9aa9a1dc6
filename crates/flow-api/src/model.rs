//! OData payloads of the management API
//!
//! Single entities arrive as `{"d": {...}}`, collections as
//! `{"d": {"results": [...]}}`. Unknown properties such as `__metadata`
//! are ignored.

use flow_content::ArtifactKind;
use serde::{Deserialize, Serialize};

/// Version string the remote reports for an unsaved draft.
pub const DRAFT_VERSION: &str = "Active";

/// Version selector resolving to the latest saved version.
pub const ACTIVE: &str = "active";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub d: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Results<T> {
    pub results: Vec<T>,
}

/// A designtime artifact entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ArtifactEntity {
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub package_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// An artifact listed in a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: String,
    pub name: String,
    pub version: String,
    pub kind: ArtifactKind,
    pub package_id: String,
    /// Derived from `version`; otherwise opaque
    pub draft: bool,
}

impl Artifact {
    pub fn from_entity(entity: ArtifactEntity, kind: ArtifactKind) -> Self {
        let draft = entity.version == DRAFT_VERSION;
        Self {
            id: entity.id,
            name: entity.name,
            version: entity.version,
            kind,
            package_id: entity.package_id,
            draft,
        }
    }
}

/// Result of a designtime existence and version lookup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArtifactStatus {
    pub exists: bool,
    pub version: String,
    pub description: Option<String>,
}

impl ArtifactStatus {
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Whether a package may be modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageMode {
    ReadOnly,
    Editable,
}

impl PackageMode {
    pub fn from_remote(mode: Option<&str>) -> Self {
        match mode {
            Some("READ_ONLY") => Self::ReadOnly,
            _ => Self::Editable,
        }
    }
}

/// Writable properties of an integration package.
///
/// Also the shape of the package file read by `update package` and written
/// next to the artifacts by a pull with package details enabled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct PackageDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_of_business: Option<String>,
}

/// An integration package as returned by the tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub descriptor: PackageDescriptor,
    /// The full `{"d": {...}}` document as received
    pub raw: serde_json::Value,
}

impl Package {
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn mode(&self) -> PackageMode {
        PackageMode::from_remote(self.descriptor.mode.as_deref())
    }

    pub fn is_read_only(&self) -> bool {
        self.mode() == PackageMode::ReadOnly
    }
}

/// A runtime artifact entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RuntimeStatus {
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub status: String,
}

impl RuntimeStatus {
    pub fn is_started(&self) -> bool {
        self.status.starts_with("START")
    }

    pub fn is_error(&self) -> bool {
        self.status == "ERROR"
    }
}
