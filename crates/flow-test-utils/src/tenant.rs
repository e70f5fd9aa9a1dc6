//! [`FakeTenant`], an in-memory stand-in for the management API.
//!
//! Implements [`HttpTransport`] by routing requests onto in-memory state,
//! so everything above the transport runs unmodified in tests. The version
//! of an uploaded artifact is read from its manifest, the way a real tenant
//! derives it from `Bundle-Version`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flow_api::{ApiClient, HttpTransport, Method, Request, Response};
use flow_content::{ArtifactKind, Manifest};
use flow_fs::NormalizedPath;
use serde_json::{Value, json};

use crate::BundleBuilder;

/// One request as seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
}

impl RecordedRequest {
    pub fn is_mutation(&self) -> bool {
        self.method.is_mutating()
    }

    /// The artifact id named in an entity key or deploy query, if any.
    pub fn artifact_id(&self) -> Option<String> {
        key_value(&self.path, "Id")
    }
}

#[derive(Debug, Clone)]
struct StoredArtifact {
    id: String,
    name: String,
    package_id: String,
    version: String,
    content: Vec<u8>,
}

#[derive(Debug, Clone)]
struct Failure {
    method: Method,
    path_fragment: String,
    status: u16,
    body: String,
}

#[derive(Debug, Default)]
struct State {
    packages: BTreeMap<String, Value>,
    artifacts: BTreeMap<(ArtifactKind, String), StoredArtifact>,
    runtime: BTreeMap<String, (String, String)>,
    pending_polls: BTreeMap<String, usize>,
    deploy_polls: usize,
    deploy_failures: Vec<String>,
    failures: Vec<Failure>,
    requests: Vec<RecordedRequest>,
}

/// In-memory management API.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use flow_content::ArtifactKind;
/// use flow_test_utils::{BundleBuilder, FakeTenant};
///
/// let tenant = Arc::new(FakeTenant::new());
/// tenant.add_package("Pkg", "Package");
/// tenant.add_artifact("Pkg", &BundleBuilder::new(ArtifactKind::Integration, "Flow_A"));
/// let client = FakeTenant::client(&tenant);
/// ```
#[derive(Debug, Default)]
pub struct FakeTenant {
    state: Mutex<State>,
}

impl FakeTenant {
    pub fn new() -> Self {
        Self::default()
    }

    /// An [`ApiClient`] backed by this tenant.
    pub fn client(tenant: &Arc<Self>) -> ApiClient {
        ApiClient::new(tenant.clone())
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ----- seeding -----

    pub fn add_package(&self, id: &str, name: &str) {
        self.add_package_with_mode(id, name, "EDIT_ALLOWED");
    }

    pub fn add_read_only_package(&self, id: &str, name: &str) {
        self.add_package_with_mode(id, name, "READ_ONLY");
    }

    fn add_package_with_mode(&self, id: &str, name: &str, mode: &str) {
        self.state().packages.insert(
            id.to_string(),
            json!({
                "Id": id,
                "Name": name,
                "ShortText": name,
                "Description": format!("{name} description"),
                "Version": "1.0.0",
                "Vendor": "ACME",
                "Mode": mode,
            }),
        );
    }

    /// Store a saved artifact built from `bundle` at the bundle's version.
    pub fn add_artifact(&self, package_id: &str, bundle: &BundleBuilder) {
        let content = bundle.archive();
        let version = manifest_version(&content).unwrap_or_else(|| "1.0.0".to_string());
        self.store(package_id, bundle, version, content);
    }

    /// Store an unsaved draft; the tenant reports its version as `Active`.
    pub fn add_draft(&self, package_id: &str, bundle: &BundleBuilder) {
        self.store(package_id, bundle, "Active".to_string(), bundle.archive());
    }

    fn store(&self, package_id: &str, bundle: &BundleBuilder, version: String, content: Vec<u8>) {
        self.state().artifacts.insert(
            (bundle.kind(), bundle.id().to_string()),
            StoredArtifact {
                id: bundle.id().to_string(),
                name: bundle.artifact_name().to_string(),
                package_id: package_id.to_string(),
                version,
                content,
            },
        );
    }

    /// Deployments report `STARTING` for this many status checks first.
    pub fn set_deploy_polls(&self, polls: usize) {
        self.state().deploy_polls = polls;
    }

    /// Deployments of `id` end in `ERROR`.
    pub fn fail_deploy(&self, id: &str) {
        self.state().deploy_failures.push(id.to_string());
    }

    /// Answer every `method` request whose path contains `path_fragment`
    /// with `status` and `body`.
    pub fn fail_on(&self, method: Method, path_fragment: &str, status: u16, body: &str) {
        self.state().failures.push(Failure {
            method,
            path_fragment: path_fragment.to_string(),
            status,
            body: body.to_string(),
        });
    }

    // ----- inspection -----

    pub fn artifact_version(&self, kind: ArtifactKind, id: &str) -> Option<String> {
        self.state()
            .artifacts
            .get(&(kind, id.to_string()))
            .map(|a| a.version.clone())
    }

    pub fn artifact_content(&self, kind: ArtifactKind, id: &str) -> Option<Vec<u8>> {
        self.state()
            .artifacts
            .get(&(kind, id.to_string()))
            .map(|a| a.content.clone())
    }

    pub fn has_package(&self, id: &str) -> bool {
        self.state().packages.contains_key(id)
    }

    pub fn package_field(&self, id: &str, field: &str) -> Option<String> {
        self.state()
            .packages
            .get(id)
            .and_then(|p| p.get(field))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn runtime_status(&self, id: &str) -> Option<String> {
        self.state().runtime.get(id).map(|(_, s)| s.clone())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    pub fn mutations(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(RecordedRequest::is_mutation)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    // ----- routing -----

    fn route(&self, request: &Request) -> Response {
        let path = request.path.as_str();
        let Some(resource) = path.strip_prefix("/api/v1/") else {
            return not_found(path);
        };

        if resource.is_empty() {
            return Response::new(200, "").with_header("x-csrf-token", "fake-token");
        }
        if let Some(rest) = resource.strip_prefix("IntegrationPackages") {
            return self.route_packages(request, rest);
        }
        if let Some(rest) = resource.strip_prefix("IntegrationRuntimeArtifacts") {
            return self.route_runtime(request, rest);
        }
        if resource.starts_with("Deploy") {
            return self.deploy(resource);
        }
        for kind in ArtifactKind::ALL {
            let set = format!("{}DesigntimeArtifacts", kind.as_str());
            if let Some(rest) = resource.strip_prefix(set.as_str()) {
                return self.route_designtime(request, kind, rest);
            }
        }
        not_found(path)
    }

    fn route_packages(&self, request: &Request, rest: &str) -> Response {
        if rest.is_empty() {
            return match request.method {
                Method::Post => self.create_package(request),
                _ => method_not_allowed(),
            };
        }
        let Some(id) = key_value(rest, "") else {
            return not_found(rest);
        };
        let listing = rest.split_once(")/").map(|(_, set)| set.to_string());

        if let Some(set) = listing {
            let Some(kind) = ArtifactKind::ALL
                .into_iter()
                .find(|k| set == format!("{}DesigntimeArtifacts", k.as_str()))
            else {
                return not_found(&set);
            };
            let state = self.state();
            if !state.packages.contains_key(&id) {
                return not_found(&id);
            }
            let results: Vec<Value> = state
                .artifacts
                .iter()
                .filter(|((k, _), a)| *k == kind && a.package_id == id)
                .map(|(_, a)| artifact_json(a))
                .collect();
            return json_response(200, json!({"d": {"results": results}}));
        }

        let mut state = self.state();
        match request.method {
            Method::Get => match state.packages.get(&id) {
                Some(package) => json_response(200, json!({"d": package})),
                None => not_found(&id),
            },
            Method::Put => {
                let Ok(update) = request.body_json::<Value>() else {
                    return Response::new(400, "invalid body");
                };
                match state.packages.get_mut(&id) {
                    Some(Value::Object(existing)) => {
                        if let Value::Object(fields) = update {
                            existing.extend(fields);
                        }
                        Response::new(202, "")
                    }
                    _ => not_found(&id),
                }
            }
            Method::Delete => match state.packages.remove(&id) {
                Some(_) => {
                    state.artifacts.retain(|_, a| a.package_id != id);
                    Response::new(202, "")
                }
                None => not_found(&id),
            },
            Method::Post => method_not_allowed(),
        }
    }

    fn create_package(&self, request: &Request) -> Response {
        let Ok(body) = request.body_json::<Value>() else {
            return Response::new(400, "invalid body");
        };
        let Some(id) = body.get("Id").and_then(Value::as_str).map(str::to_string) else {
            return Response::new(400, "Id is required");
        };
        let mut state = self.state();
        if state.packages.contains_key(&id) {
            return Response::new(409, format!("Package {id} already exists"));
        }
        state.packages.insert(id, body.clone());
        json_response(201, json!({"d": body}))
    }

    fn route_designtime(&self, request: &Request, kind: ArtifactKind, rest: &str) -> Response {
        if rest.is_empty() {
            return match request.method {
                Method::Post => self.create_artifact(request, kind),
                _ => method_not_allowed(),
            };
        }
        let Some(id) = key_value(rest, "Id") else {
            return not_found(rest);
        };
        let version = key_value(rest, "Version").unwrap_or_else(|| "active".to_string());
        let wants_value = rest.ends_with("/$value");
        let key = (kind, id.clone());

        let mut state = self.state();
        let Some(stored) = state.artifacts.get(&key).cloned() else {
            return not_found(&id);
        };
        if version != "active" && version != stored.version {
            return not_found(&format!("{id} version {version}"));
        }

        match request.method {
            Method::Get if wants_value => Response::new(200, stored.content)
                .with_header("Content-Type", "application/zip"),
            Method::Get => json_response(200, json!({"d": artifact_json(&stored)})),
            Method::Put => {
                let Some(content) = uploaded_content(request) else {
                    return Response::new(400, "ArtifactContent is required");
                };
                let name = request
                    .body_json::<Value>()
                    .ok()
                    .and_then(|b| b.get("Name").and_then(Value::as_str).map(str::to_string))
                    .unwrap_or(stored.name.clone());
                let version = manifest_version(&content).unwrap_or(stored.version.clone());
                state.artifacts.insert(
                    key,
                    StoredArtifact {
                        name,
                        version,
                        content,
                        ..stored
                    },
                );
                Response::new(200, "")
            }
            Method::Delete => {
                state.artifacts.remove(&key);
                Response::new(200, "")
            }
            Method::Post => method_not_allowed(),
        }
    }

    fn create_artifact(&self, request: &Request, kind: ArtifactKind) -> Response {
        let Ok(body) = request.body_json::<Value>() else {
            return Response::new(400, "invalid body");
        };
        let field = |name: &str| body.get(name).and_then(Value::as_str).map(str::to_string);
        let (Some(id), Some(package_id)) = (field("Id"), field("PackageId")) else {
            return Response::new(400, "Id and PackageId are required");
        };
        let Some(content) = uploaded_content(request) else {
            return Response::new(400, "ArtifactContent is required");
        };

        let mut state = self.state();
        if !state.packages.contains_key(&package_id) {
            return Response::new(400, format!("Integration package {package_id} does not exist"));
        }
        let key = (kind, id.clone());
        if state.artifacts.contains_key(&key) {
            return Response::new(
                500,
                format!(r#"{{"error":{{"message":{{"value":"Artifact {id} already exists"}}}}}}"#),
            );
        }
        let version = manifest_version(&content).unwrap_or_else(|| "1.0.0".to_string());
        let artifact = StoredArtifact {
            name: field("Name").unwrap_or_else(|| id.clone()),
            id,
            package_id,
            version,
            content,
        };
        let response = json_response(201, json!({"d": artifact_json(&artifact)}));
        state.artifacts.insert(key, artifact);
        response
    }

    fn deploy(&self, resource: &str) -> Response {
        let Some((function, query)) = resource.split_once('?') else {
            return Response::new(400, "missing query");
        };
        let Some(kind) = ArtifactKind::ALL
            .into_iter()
            .find(|k| function == format!("Deploy{}DesigntimeArtifact", k.as_str()))
        else {
            return not_found(function);
        };
        let Some(id) = key_value(query, "Id") else {
            return Response::new(400, "Id is required");
        };

        let mut state = self.state();
        let Some(version) = state
            .artifacts
            .get(&(kind, id.clone()))
            .map(|a| a.version.clone())
        else {
            return not_found(&id);
        };
        let status = if state.deploy_failures.contains(&id) {
            "ERROR"
        } else {
            "STARTED"
        };
        let polls = state.deploy_polls;
        state.pending_polls.insert(id.clone(), polls);
        state.runtime.insert(id, (version, status.to_string()));
        Response::new(202, "")
    }

    fn route_runtime(&self, request: &Request, rest: &str) -> Response {
        if request.method != Method::Get {
            return method_not_allowed();
        }
        let Some(id) = key_value(rest, "") else {
            return not_found(rest);
        };
        let mut state = self.state();
        let Some((version, status)) = state.runtime.get(&id).cloned() else {
            return not_found(&id);
        };
        if rest.ends_with("/ErrorInformation/$value") {
            return if status == "ERROR" {
                Response::new(200, format!("Deployment of {id} failed"))
            } else {
                Response::new(204, "")
            };
        }

        let pending = state.pending_polls.entry(id.clone()).or_insert(0);
        let reported = if *pending > 0 {
            *pending -= 1;
            "STARTING".to_string()
        } else {
            status
        };
        json_response(
            200,
            json!({"d": {"Id": id, "Version": version, "Status": reported}}),
        )
    }

    fn injected_failure(&self, request: &Request) -> Option<Response> {
        self.state()
            .failures
            .iter()
            .find(|f| f.method == request.method && request.path.contains(&f.path_fragment))
            .map(|f| Response::new(f.status, f.body.clone()))
    }
}

impl HttpTransport for FakeTenant {
    fn execute(&self, request: Request) -> flow_api::Result<Response> {
        self.state().requests.push(RecordedRequest {
            method: request.method,
            path: request.path.clone(),
        });
        if let Some(response) = self.injected_failure(&request) {
            return Ok(response);
        }
        Ok(self.route(&request))
    }
}

fn artifact_json(artifact: &StoredArtifact) -> Value {
    json!({
        "Id": artifact.id,
        "Name": artifact.name,
        "PackageId": artifact.package_id,
        "Version": artifact.version,
        "Description": Value::Null,
    })
}

fn json_response(status: u16, body: Value) -> Response {
    Response::new(status, body.to_string()).with_header("Content-Type", "application/json")
}

fn not_found(what: &str) -> Response {
    Response::new(404, format!(r#"{{"error":{{"message":{{"value":"{what} not found"}}}}}}"#))
}

fn method_not_allowed() -> Response {
    Response::new(405, "method not allowed")
}

fn uploaded_content(request: &Request) -> Option<Vec<u8>> {
    let body: Value = request.body_json().ok()?;
    STANDARD
        .decode(body.get("ArtifactContent")?.as_str()?)
        .ok()
}

fn manifest_version(content: &[u8]) -> Option<String> {
    let temp = tempfile::tempdir().ok()?;
    let dir = NormalizedPath::new(temp.path());
    flow_content::bundle::unpack(content, &dir).ok()?;
    Manifest::load(&dir).ok()?.version().map(str::to_string)
}

/// Extract a quoted key value from `(Id='x',Version='y')` or `?Id='x'&...`.
///
/// An empty `name` matches the single unnamed key of `('x')`.
fn key_value(text: &str, name: &str) -> Option<String> {
    let start = if name.is_empty() {
        text.find("('")? + 1
    } else {
        let marker = format!("{name}='");
        text.find(&marker)? + marker.len() - 1
    };
    let quoted = &text[start + 1..];
    let mut value = String::new();
    let mut chars = quoted.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                value.push('\'');
                continue;
            }
            return Some(percent_decode(&value));
        }
        value.push(c);
    }
    None
}

fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = bytes.get(i + 1..i + 3)
            && let Ok(hex) = std::str::from_utf8(hex)
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
