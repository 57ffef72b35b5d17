//! POM/JAR retrieval with ordered repository fallback, and extraction of a
//! POM's direct dependencies.
//!
//! Resolution is single-document: properties are read from the artifact's own
//! POM only, with no parent-POM inheritance.

use crate::errors::{CgError, CgResult};
use crate::maven::MavenCoordinate;
use crate::revision::{Dependency, DependencySet, WILDCARD_VERSION};
use roxmltree::{Document, Node};
use rustc_hash::FxHashMap;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

/// Downloads POM and JAR files for Maven coordinates and resolves the direct
/// dependencies declared in a POM.
pub struct MavenResolver {
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Statuses are handled per repository below
        .timeout_global(Some(Duration::from_secs(60)))
        .build()
        .new_agent()
}

impl Default for MavenResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MavenResolver {
    pub fn new() -> Self {
        Self {
            agent: make_agent(),
        }
    }

    /// Resolve the direct dependencies of `coordinate` from its POM.
    ///
    /// A missing or unparseable POM yields an empty set rather than failing
    /// the artifact: dependency metadata is auxiliary to the call graph.
    pub fn resolve_dependencies(&self, coordinate: &MavenCoordinate) -> DependencySet {
        let pom = match self.download_pom(coordinate) {
            Ok(pom) => pom,
            Err(e) => {
                error!("Could not fetch POM file for {}: {}", coordinate, e);
                return DependencySet::new();
            }
        };

        match extract_dependencies(&pom) {
            Ok(depset) => depset,
            Err(e) => {
                error!("Error parsing POM file for {}: {}", coordinate, e);
                DependencySet::new()
            }
        }
    }

    /// Download the POM, trying each configured repository in order.
    pub fn download_pom(&self, coordinate: &MavenCoordinate) -> CgResult<String> {
        for repo in coordinate.repos() {
            if let Some(bytes) = self.fetch(&coordinate.pom_url(repo)) {
                return Ok(String::from_utf8_lossy(&bytes).into_owned());
            }
        }
        Err(CgError::NotFound {
            what: "POM",
            coordinate: coordinate.coordinate(),
        })
    }

    /// Download the JAR into a temporary file, trying each configured
    /// repository in order. The caller owns the file's lifetime; dropping the
    /// handle deletes it.
    pub fn download_jar(&self, coordinate: &MavenCoordinate) -> CgResult<NamedTempFile> {
        debug!("Downloading JAR for {}", coordinate);

        for repo in coordinate.repos() {
            if let Some(bytes) = self.fetch(&coordinate.jar_url(repo)) {
                let mut file = tempfile::Builder::new()
                    .prefix("fasten")
                    .suffix(".jar")
                    .tempfile()?;
                file.write_all(&bytes)?;
                file.flush()?;
                return Ok(file);
            }
        }
        Err(CgError::NotFound {
            what: "JAR",
            coordinate: coordinate.coordinate(),
        })
    }

    /// One GET against one repository. `None` means the artifact is absent or
    /// the repository unreachable; the caller falls back to the next one.
    fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        debug!("HTTP GET: {}", url);

        let response = match self.agent.get(url).call() {
            Ok(response) => response,
            Err(e) => {
                warn!("Error retrieving URL {}: {}", url, e);
                return None;
            }
        };

        let status = response.status().as_u16();
        if status >= 400 {
            debug!("HTTP {} for {}", status, url);
            return None;
        }

        match response.into_body().read_to_vec() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Error reading response body from {}: {}", url, e);
                None
            }
        }
    }
}

/// Extract the DependencySet from POM text: the root `<dependencies>` block
/// first, then each `<profile>` with a non-empty block, in document order.
/// Blocks yielding zero dependencies are omitted.
pub fn extract_dependencies(pom: &str) -> CgResult<DependencySet> {
    let doc = Document::parse(pom)
        .map_err(|e| CgError::MalformedInput(format!("unparseable POM XML: {e}")))?;
    let root = doc.root_element();

    let mut properties: FxHashMap<String, String> = FxHashMap::default();
    if let Some(block) = child_element(root, "properties") {
        for property in block.children().filter(Node::is_element) {
            properties.insert(property.tag_name().name().to_string(), element_text(property));
        }
    }

    let mut depset = DependencySet::new();

    if let Some(block) = child_element(root, "dependencies") {
        let resolved = block_dependencies(block, &properties);
        if !resolved.is_empty() {
            depset.push(resolved);
        }
    }

    if let Some(profiles) = child_element(root, "profiles") {
        for profile in profiles
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "profile")
        {
            if let Some(block) = child_element(profile, "dependencies") {
                let resolved = block_dependencies(block, &properties);
                if !resolved.is_empty() {
                    depset.push(resolved);
                }
            }
        }
    }

    Ok(depset)
}

/// Dependencies of one `<dependencies>` block, with `${property}` substitution
/// applied to versions. A lookup miss leaves the version undefined rather than
/// failing the block.
fn block_dependencies(
    block: Node<'_, '_>,
    properties: &FxHashMap<String, String>,
) -> Vec<Dependency> {
    let mut deps = Vec::new();

    for dep in block
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "dependency")
    {
        let group_id = child_element(dep, "groupId").map(element_text);
        let artifact_id = child_element(dep, "artifactId").map(element_text);
        let (group_id, artifact_id) = match (group_id, artifact_id) {
            (Some(g), Some(a)) if !g.is_empty() && !a.is_empty() => (g, a),
            _ => {
                warn!("Skipping dependency entry without groupId/artifactId");
                continue;
            }
        };

        let version = match child_element(dep, "version") {
            Some(node) => {
                let text = element_text(node);
                if text.starts_with('$') {
                    let key = text
                        .trim_start_matches('$')
                        .trim_start_matches('{')
                        .trim_end_matches('}');
                    properties.get(key).cloned()
                } else {
                    Some(text)
                }
            }
            None => Some(WILDCARD_VERSION.to_string()),
        };

        deps.push(Dependency::new(format!("{group_id}:{artifact_id}"), version));
    }

    deps
}

/// First child element with the given local name, ignoring XML namespaces,
/// like the original's `local-name()` selection.
fn child_element<'a, 'd>(node: Node<'a, 'd>, name: &str) -> Option<Node<'a, 'd>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn element_text(node: Node<'_, '_>) -> String {
    node.text().unwrap_or_default().trim().to_string()
}
