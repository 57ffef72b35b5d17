//! The FASTEN revision call graph document and its building blocks.
//!
//! Constructed once per artifact, fully populated, immutable thereafter, and
//! serialized to JSON exactly once.

use crate::uri::MethodUri;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Forge identifier for every revision this crate produces.
pub const FORGE: &str = "mvn";

/// Name of the external analyzer whose output this crate re-encodes.
pub const GENERATOR: &str = "WALA";

/// Version placeholder for a dependency whose POM gave no `<version>` element.
pub const WILDCARD_VERSION: &str = "*";

/// Method identifier, local to one declaring type within one translation run.
pub type MethodId = u32;

/// A version constraint. Real Maven range syntax is not modeled: a pinned
/// version sets both bounds to the same value, a missing version uses the
/// wildcard, and a failed property lookup leaves both bounds null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(rename = "lowerBound")]
    pub lower_bound: Option<String>,
    #[serde(rename = "upperBound")]
    pub upper_bound: Option<String>,
}

impl Constraint {
    /// An exact constraint with both bounds pinned to `version`.
    pub fn exact(version: Option<String>) -> Self {
        Self {
            lower_bound: version.clone(),
            upper_bound: version,
        }
    }
}

/// One direct dependency of the analyzed artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub forge: String,
    pub product: String,
    pub constraints: Vec<Constraint>,
}

impl Dependency {
    pub fn new(product: impl Into<String>, version: Option<String>) -> Self {
        Self {
            forge: FORGE.to_string(),
            product: product.into(),
            constraints: vec![Constraint::exact(version)],
        }
    }
}

/// One inner list per independently resolved POM block, in resolution order.
pub type DependencySet = Vec<Vec<Dependency>>;

/// Class-hierarchy entry: the methods observed for one type, keyed by their
/// per-type IDs, plus supertype URIs when the analyzer supplied them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub methods: IndexMap<MethodId, MethodUri>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclasses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<String>>,
}

/// Serialized form of the internal/external call collections.
///
/// External-call keys are `"{callerId},{calleeUri}"` and every per-kind
/// occurrence counter is a decimal string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(rename = "internalCalls")]
    pub internal_calls: Vec<(MethodId, MethodId)>,
    #[serde(rename = "externalCalls")]
    pub external_calls: IndexMap<String, IndexMap<String, String>>,
}

impl Graph {
    pub fn total_calls(&self) -> usize {
        self.internal_calls.len() + self.external_calls.len()
    }
}

/// One versioned release of an artifact together with its call graph.
#[derive(Debug, Clone, Serialize)]
pub struct RevisionCallGraph {
    pub forge: String,
    pub product: String,
    pub version: String,
    pub generator: String,
    pub depset: DependencySet,
    pub cha: IndexMap<String, TypeRecord>,
    pub graph: Graph,
    pub timestamp: i64,
}

impl RevisionCallGraph {
    pub fn new(
        product: impl Into<String>,
        version: impl Into<String>,
        timestamp: i64,
        depset: DependencySet,
        cha: IndexMap<String, TypeRecord>,
        graph: Graph,
    ) -> Self {
        Self {
            forge: FORGE.to_string(),
            product: product.into(),
            version: version.into(),
            generator: GENERATOR.to_string(),
            depset,
            cha,
            graph,
            timestamp,
        }
    }

    /// True when the analyzer produced no calls at all. Such a revision is
    /// valid but callers usually choose not to emit output for it.
    pub fn is_call_graph_empty(&self) -> bool {
        self.graph.internal_calls.is_empty() && self.graph.external_calls.is_empty()
    }

    /// Output file name: `<artifactId>_<groupId>_<version>.json`.
    pub fn file_name(&self) -> String {
        match self.product.split_once(':') {
            Some((group, artifact)) => format!("{}_{}_{}.json", artifact, group, self.version),
            None => format!("{}_{}.json", self.product, self.version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_exact() {
        let pinned = Constraint::exact(Some("1.8".to_string()));
        assert_eq!(pinned.lower_bound.as_deref(), Some("1.8"));
        assert_eq!(pinned.lower_bound, pinned.upper_bound);

        let missing = Constraint::exact(None);
        assert_eq!(missing.lower_bound, None);
        assert_eq!(missing.upper_bound, None);
    }

    #[test]
    fn test_file_name() {
        let rcg = RevisionCallGraph::new(
            "org.slf4j:slf4j-api",
            "1.7.29",
            0,
            vec![],
            IndexMap::new(),
            Graph::default(),
        );
        assert_eq!(rcg.file_name(), "slf4j-api_org.slf4j_1.7.29.json");
    }

    #[test]
    fn test_empty_detection() {
        let mut rcg = RevisionCallGraph::new(
            "g:a",
            "1.0",
            0,
            vec![],
            IndexMap::new(),
            Graph::default(),
        );
        assert!(rcg.is_call_graph_empty());

        rcg.graph.internal_calls.push((0, 1));
        assert!(!rcg.is_call_graph_empty());
    }

    #[test]
    fn test_document_shape() {
        let mut cha = IndexMap::new();
        let uri: MethodUri = "/ns/T.m()%2Fjava.lang%2FVoidType".parse().unwrap();
        let mut record = TypeRecord::default();
        record.methods.insert(0, uri);
        cha.insert("/ns/T".to_string(), record);

        let mut graph = Graph::default();
        graph.internal_calls.push((0, 1));
        let mut meta = IndexMap::new();
        meta.insert("invokespecial".to_string(), "1".to_string());
        graph
            .external_calls
            .insert("0,/java.lang/Object.Object()%2Fjava.lang%2FVoidType".to_string(), meta);

        let rcg = RevisionCallGraph::new(
            "g:a",
            "1.0",
            1574072773,
            vec![vec![Dependency::new("g:dep", Some("2.0".to_string()))]],
            cha,
            graph,
        );

        let value = serde_json::to_value(&rcg).unwrap();
        assert_eq!(value["forge"], "mvn");
        assert_eq!(value["generator"], "WALA");
        assert_eq!(value["timestamp"], 1574072773);
        assert_eq!(value["depset"][0][0]["constraints"][0]["lowerBound"], "2.0");
        assert_eq!(
            value["cha"]["/ns/T"]["methods"]["0"],
            "/ns/T.m()%2Fjava.lang%2FVoidType"
        );
        assert_eq!(value["graph"]["internalCalls"][0][0], 0);
        let external = &value["graph"]["externalCalls"]
            ["0,/java.lang/Object.Object()%2Fjava.lang%2FVoidType"];
        assert_eq!(external["invokespecial"], "1");
        // Supertype lists are omitted when unknown.
        assert!(value["cha"]["/ns/T"].get("superclasses").is_none());
    }
}
