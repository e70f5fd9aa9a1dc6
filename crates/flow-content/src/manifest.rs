//! `META-INF/MANIFEST.MF` reading and writing
//!
//! Only the main section is modelled. Header order is preserved so a
//! stamped manifest differs from its source in the stamped header alone.

use flow_fs::{NormalizedPath, io};

use crate::kind::ArtifactKind;
use crate::{Error, Result};

/// Relative location of the manifest inside every bundle.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Headers that change on every save without changing content.
pub const VOLATILE_HEADERS: &[&str] = &["Bundle-Version"];

/// Manifest lines are limited to 72 bytes including the header name.
const MAX_LINE_BYTES: usize = 72;

/// Parsed main section of a bundle manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    headers: Vec<(String, String)>,
}

impl Manifest {
    /// Parse manifest text.
    ///
    /// Continuation lines start with a single space and are appended to the
    /// previous header's value. Parsing stops at the first blank line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut headers: Vec<(String, String)> = Vec::new();

        for (lineno, raw) in text.split('\n').enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                if headers.is_empty() {
                    continue;
                }
                break;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                let (_, value) = headers.last_mut().ok_or_else(|| {
                    Error::manifest(format!("line {}: continuation without header", lineno + 1))
                })?;
                value.push_str(continuation);
                continue;
            }
            let (name, value) = line.split_once(':').ok_or_else(|| {
                Error::manifest(format!("line {}: expected 'Name: value'", lineno + 1))
            })?;
            headers.push((name.trim().to_string(), value.trim_start().to_string()));
        }

        Ok(Self { headers })
    }

    /// Load the manifest of the bundle rooted at `bundle_dir`.
    pub fn load(bundle_dir: &NormalizedPath) -> Result<Self> {
        let path = bundle_dir.join(MANIFEST_PATH);
        if !path.is_file() {
            return Err(Error::MissingManifest {
                path: bundle_dir.to_native(),
            });
        }
        Self::parse(&io::read_text(&path)?)
    }

    /// Write the manifest back into the bundle rooted at `bundle_dir`.
    pub fn save(&self, bundle_dir: &NormalizedPath) -> Result<()> {
        io::write_text(&bundle_dir.join(MANIFEST_PATH), &self.render())?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing an existing value in place or appending.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// `Bundle-SymbolicName` without directives such as `;singleton:=true`.
    pub fn symbolic_name(&self) -> Option<&str> {
        self.get("Bundle-SymbolicName")
            .map(|v| v.split(';').next().unwrap_or(v).trim())
    }

    pub fn name(&self) -> Option<&str> {
        self.get("Bundle-Name")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("Bundle-Version")
    }

    pub fn kind(&self) -> Result<ArtifactKind> {
        let value = self
            .get("SAP-BundleType")
            .ok_or_else(|| Error::manifest("missing SAP-BundleType header"))?;
        ArtifactKind::from_bundle_type(value)
    }

    /// Headers relevant to content identity, volatile ones removed.
    pub fn stable_headers(&self) -> Vec<(&str, &str)> {
        let mut stable: Vec<(&str, &str)> = self
            .headers()
            .filter(|(n, _)| !VOLATILE_HEADERS.contains(n))
            .collect();
        stable.sort();
        stable
    }

    /// Render with CRLF line endings and 72-byte line wrapping.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.headers {
            let line = format!("{name}: {value}");
            let mut first = true;
            let mut rest = line.as_str();
            while !rest.is_empty() {
                let budget = if first { MAX_LINE_BYTES } else { MAX_LINE_BYTES - 1 };
                let cut = floor_char_boundary(rest, budget);
                if !first {
                    out.push(' ');
                }
                out.push_str(&rest[..cut]);
                out.push_str("\r\n");
                rest = &rest[cut..];
                first = false;
            }
        }
        out.push_str("\r\n");
        out
    }
}

fn floor_char_boundary(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut cut = max;
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

/// Overwrite `Bundle-Version` in the bundle rooted at `bundle_dir`.
pub fn stamp_version(bundle_dir: &NormalizedPath, version: &str) -> Result<()> {
    let mut manifest = Manifest::load(bundle_dir)?;
    manifest.set("Bundle-Version", version);
    manifest.save(bundle_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "Manifest-Version: 1.0\r\n\
Bundle-SymbolicName: Integration_Test_IFlow; singleton:=true\r\n\
Bundle-Name: Integration Test IFlow\r\n\
Bundle-Version: 1.0.0\r\n\
SAP-BundleType: IntegrationFlow\r\n\
Import-Package: com.sap.esb.application.services.cxf.interceptor,com.sap\r\n \
 .it.op.agent.api\r\n\
\r\n";

    #[test]
    fn parses_headers_and_continuations() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert_eq!(manifest.symbolic_name(), Some("Integration_Test_IFlow"));
        assert_eq!(manifest.name(), Some("Integration Test IFlow"));
        assert_eq!(manifest.version(), Some("1.0.0"));
        assert_eq!(manifest.kind().unwrap(), ArtifactKind::Integration);
        assert_eq!(
            manifest.get("Import-Package"),
            Some("com.sap.esb.application.services.cxf.interceptor,com.sap.it.op.agent.api")
        );
    }

    #[test]
    fn continuation_without_header_is_rejected() {
        assert!(Manifest::parse(" orphan\n").is_err());
    }

    #[test]
    fn render_wraps_long_values() {
        let mut manifest = Manifest::default();
        manifest.set("Import-Package", &"x".repeat(200));
        let rendered = manifest.render();

        for line in rendered.split("\r\n") {
            assert!(line.len() <= MAX_LINE_BYTES, "line too long: {line}");
        }
        let reparsed = Manifest::parse(&rendered).unwrap();
        assert_eq!(reparsed, manifest);
    }

    #[test]
    fn stable_headers_skip_version() {
        let manifest = Manifest::parse(SAMPLE).unwrap();
        assert!(manifest.stable_headers().iter().all(|(n, _)| *n != "Bundle-Version"));
    }
}
