//! Package descriptors from local files

use flow_api::{ApiClient, PackageDescriptor};
use flow_fs::{NormalizedPath, io};
use serde_json::Value;

use crate::{Error, Result};

/// Whether [`update_package`] created or updated the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageChange {
    Created,
    Updated,
}

/// Read a descriptor written either as `{"d": {...}}` or as a bare object.
pub fn read_descriptor(path: &NormalizedPath) -> Result<PackageDescriptor> {
    let value: Value = serde_json::from_str(&io::read_text(path)?)?;
    let entity = match value {
        Value::Object(mut map) if map.contains_key("d") => map.remove("d").unwrap_or(Value::Null),
        other => other,
    };
    let descriptor: PackageDescriptor = serde_json::from_value(entity)?;
    if descriptor.id.trim().is_empty() {
        return Err(Error::validation(format!("package file {path} has no Id")));
    }
    Ok(descriptor)
}

/// Create the package described in `path`, or update it when it exists.
///
/// Read-only packages are refused.
pub fn update_package(client: &ApiClient, path: &NormalizedPath) -> Result<PackageChange> {
    let mut descriptor = read_descriptor(path)?;
    // Mode is decided by the tenant, not by the file
    descriptor.mode = None;
    let packages = client.packages();
    match packages.get(&descriptor.id)? {
        Some(existing) if existing.is_read_only() => Err(Error::validation(format!(
            "package '{}' is read-only and cannot be updated",
            descriptor.id
        ))),
        Some(_) => {
            packages.update(&descriptor)?;
            Ok(PackageChange::Updated)
        }
        None => {
            packages.create(&descriptor)?;
            Ok(PackageChange::Created)
        }
    }
}
