//! Designtime artifact kinds

use std::fmt;
use std::str::FromStr;

use crate::diff::{DiffRule, DiffRules};
use crate::{Error, Result};

/// Relative path of the externalized parameter file inside a bundle.
pub const PARAMETERS_FILE: &str = "src/main/resources/parameters.prop";

/// Relative path of the mapping table inside a value mapping bundle.
pub const VALUE_MAPPING_FILE: &str = "value_mapping.xml";

/// The four kinds of designtime artifact a package can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Integration,
    MessageMapping,
    ScriptCollection,
    ValueMapping,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Integration,
        ArtifactKind::MessageMapping,
        ArtifactKind::ScriptCollection,
        ArtifactKind::ValueMapping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integration => "Integration",
            Self::MessageMapping => "MessageMapping",
            Self::ScriptCollection => "ScriptCollection",
            Self::ValueMapping => "ValueMapping",
        }
    }

    /// Value of the `SAP-BundleType` manifest header for this kind.
    pub fn bundle_type(&self) -> &'static str {
        match self {
            Self::Integration => "IntegrationFlow",
            Self::MessageMapping => "MessageMapping",
            Self::ScriptCollection => "ScriptCollection",
            Self::ValueMapping => "ValueMapping",
        }
    }

    pub fn from_bundle_type(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.bundle_type() == value.trim())
            .ok_or_else(|| Error::UnknownKind(value.to_string()))
    }

    /// The parts of a bundle that decide whether two copies differ.
    ///
    /// Anything outside these paths (work files, generated metadata) never
    /// triggers a write or an update.
    pub fn diff_rules(&self) -> DiffRules {
        match self {
            Self::Integration => DiffRules::new(vec![
                DiffRule::directory("META-INF"),
                DiffRule::directory("src/main/resources").ignoring("parameters.prop"),
                DiffRule::params(PARAMETERS_FILE),
            ]),
            Self::MessageMapping | Self::ScriptCollection => DiffRules::new(vec![
                DiffRule::directory("META-INF"),
                DiffRule::directory("src/main/resources"),
            ]),
            Self::ValueMapping => DiffRules::new(vec![
                DiffRule::directory("META-INF"),
                DiffRule::lines(VALUE_MAPPING_FILE),
            ]),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Integration" | "IntegrationFlow" => Ok(Self::Integration),
            "MessageMapping" => Ok(Self::MessageMapping),
            "ScriptCollection" => Ok(Self::ScriptCollection),
            "ValueMapping" => Ok(Self::ValueMapping),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}
