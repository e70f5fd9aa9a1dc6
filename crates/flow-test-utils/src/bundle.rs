//! [`BundleBuilder`] for artifact source trees.

use std::fs;
use std::path::{Path, PathBuf};

use flow_content::ArtifactKind;

/// Builds an unpacked artifact bundle on disk.
///
/// # Example
///
/// ```rust,no_run
/// use flow_content::ArtifactKind;
/// use flow_test_utils::BundleBuilder;
///
/// let dir = tempfile::tempdir().unwrap();
/// BundleBuilder::new(ArtifactKind::Integration, "Order_Flow")
///     .name("Order Flow")
///     .parameter("Host", "example.com")
///     .write_to(&dir.path().join("Order_Flow"));
/// ```
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    kind: ArtifactKind,
    id: String,
    name: String,
    version: String,
    extra_headers: Vec<(String, String)>,
    parameters: Vec<(String, String)>,
    files: Vec<(String, String)>,
}

impl BundleBuilder {
    pub fn new(kind: ArtifactKind, id: &str) -> Self {
        Self {
            kind,
            id: id.to_string(),
            name: id.to_string(),
            version: "1.0.0".to_string(),
            extra_headers: Vec::new(),
            parameters: Vec::new(),
            files: Vec::new(),
        }
    }

    /// An integration flow with a flow model that references `script_collection`.
    pub fn iflow_referencing(id: &str, script_collection: &str) -> Self {
        Self::new(ArtifactKind::Integration, id)
            .header("Import-Package", &format!("{script_collection},com.sap.it.api"))
            .file(
                &format!("src/main/resources/scenarioflows/integrationflow/{id}.iflw"),
                &format!(
                    "<bpmn2:definitions>\n  <ifl:property><key>scriptBundleId</key><value>{script_collection}</value></ifl:property>\n</bpmn2:definitions>\n"
                ),
            )
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.extra_headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Add an externalized parameter (integration flows only).
    pub fn parameter(mut self, key: &str, value: &str) -> Self {
        self.parameters.push((key.to_string(), value.to_string()));
        self
    }

    pub fn file(mut self, relative: &str, content: &str) -> Self {
        self.files.push((relative.to_string(), content.to_string()));
        self
    }

    fn manifest(&self) -> String {
        let mut manifest = format!(
            "Manifest-Version: 1.0\r\nBundle-ManifestVersion: 2\r\nBundle-SymbolicName: {}; singleton:=true\r\nBundle-Name: {}\r\nBundle-Version: {}\r\nSAP-BundleType: {}\r\n",
            self.id,
            self.name,
            self.version,
            self.kind.bundle_type()
        );
        for (name, value) in &self.extra_headers {
            manifest.push_str(&format!("{name}: {value}\r\n"));
        }
        manifest.push_str("\r\n");
        manifest
    }

    /// Write the bundle to `dir` and return it.
    ///
    /// Every kind gets the content file its diff rules look at, so two
    /// builders with equal settings produce equal bundles.
    ///
    /// # Panics
    /// Panics if the filesystem operations fail.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let write = |relative: &str, content: &str| {
            let path = dir.join(relative);
            fs::create_dir_all(path.parent().unwrap_or(dir))
                .unwrap_or_else(|e| panic!("BundleBuilder: failed to create dirs for {relative}: {e}"));
            fs::write(&path, content)
                .unwrap_or_else(|e| panic!("BundleBuilder: failed to write {relative}: {e}"));
        };

        write("META-INF/MANIFEST.MF", &self.manifest());
        write("metainfo.prop", &format!("description={}\n", self.name));

        match self.kind {
            ArtifactKind::Integration => {
                let mut params = String::from("#Store parameters\n");
                for (key, value) in &self.parameters {
                    params.push_str(&format!("{key}={value}\n"));
                }
                write("src/main/resources/parameters.prop", &params);
                write(
                    "src/main/resources/parameters.propdef",
                    "<parameters></parameters>\n",
                );
            }
            ArtifactKind::MessageMapping => {
                write(
                    &format!("src/main/resources/mapping/{}.mmap", self.id),
                    "<mapping/>\n",
                );
            }
            ArtifactKind::ScriptCollection => {
                write("src/main/resources/script/script1.groovy", "def run() { }\n");
            }
            ArtifactKind::ValueMapping => {
                write("value_mapping.xml", "<vm version=\"2.0\"></vm>\n");
            }
        }

        for (relative, content) in &self.files {
            write(relative, content);
        }
        dir.to_path_buf()
    }

    /// Zip the bundle in memory, for seeding a [`crate::FakeTenant`].
    ///
    /// # Panics
    /// Panics if the bundle cannot be written or packed.
    pub fn archive(&self) -> Vec<u8> {
        let temp = tempfile::tempdir().expect("BundleBuilder::archive: temp dir");
        let dir = self.write_to(&temp.path().join(&self.id));
        flow_content::bundle::pack_dir(&flow_fs::NormalizedPath::new(dir))
            .unwrap_or_else(|e| panic!("BundleBuilder::archive: failed to pack {}: {e}", self.id))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn artifact_name(&self) -> &str {
        &self.name
    }
}
