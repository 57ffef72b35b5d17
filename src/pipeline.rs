//! Per-artifact orchestration: resolve coordinate, fetch the JAR, run the
//! analyzer, translate, and assemble the revision document.
//!
//! Each function is a pure `input -> Result` step; the caller decides what a
//! failure means (abort, or record and continue a batch).

use crate::errors::CgResult;
use crate::graph::{translate, CallGraphBuilder, RawCallGraph};
use crate::maven::{MavenCoordinate, MavenResolver};
use crate::revision::{DependencySet, RevisionCallGraph};
use std::path::Path;
use tracing::info;

/// Build the revision call graph for a Maven coordinate: download the JAR
/// with repository fallback, run the analyzer over it, translate the result,
/// and resolve the coordinate's direct dependencies from its POM.
pub fn build_from_coordinate(
    resolver: &MavenResolver,
    builder: &dyn CallGraphBuilder,
    coordinate: &MavenCoordinate,
    timestamp: i64,
) -> CgResult<RevisionCallGraph> {
    info!("Generating call graph for {}", coordinate);

    let jar = resolver.download_jar(coordinate)?;
    let raw = builder.build_call_graph(jar.path())?;
    let partial = translate(&raw)?;
    let depset = resolver.resolve_dependencies(coordinate);

    let (cha, graph) = partial.finish();
    Ok(RevisionCallGraph::new(
        coordinate.product(),
        coordinate.version_constraint(),
        timestamp,
        depset,
        cha,
        graph,
    ))
}

/// Build the revision call graph for a local JAR with a pre-resolved depset.
pub fn build_from_file(
    builder: &dyn CallGraphBuilder,
    jar: &Path,
    product: &str,
    version: &str,
    timestamp: i64,
    depset: DependencySet,
) -> CgResult<RevisionCallGraph> {
    let raw = builder.build_call_graph(jar)?;
    build_from_raw(&raw, product, version, timestamp, depset)
}

/// Assemble the revision document from an already-built raw graph.
pub fn build_from_raw(
    raw: &RawCallGraph,
    product: &str,
    version: &str,
    timestamp: i64,
    depset: DependencySet,
) -> CgResult<RevisionCallGraph> {
    let partial = translate(raw)?;
    let (cha, graph) = partial.finish();
    Ok(RevisionCallGraph::new(
        product, version, timestamp, depset, cha, graph,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CallKind, MethodSignature, RawEdge, RawNode};

    #[test]
    fn test_build_from_raw() {
        let raw = RawCallGraph {
            nodes: vec![
                RawNode::Internal(MethodSignature::new("a/B", "m", "()V")),
                RawNode::Internal(MethodSignature::new("a/B", "n", "()V")),
            ],
            edges: vec![RawEdge {
                caller: 0,
                callee: 1,
                kind: CallKind::Virtual,
            }],
            hierarchy: vec![],
        };

        let rcg = build_from_raw(&raw, "g:a", "1.0", 42, vec![]).unwrap();
        assert_eq!(rcg.forge, "mvn");
        assert_eq!(rcg.generator, "WALA");
        assert_eq!(rcg.timestamp, 42);
        assert_eq!(rcg.graph.internal_calls, vec![(0, 1)]);
        assert!(!rcg.is_call_graph_empty());
    }

    #[test]
    fn test_build_from_raw_empty_graph_is_detectable() {
        let rcg = build_from_raw(&RawCallGraph::default(), "g:a", "1.0", 0, vec![]).unwrap();
        assert!(rcg.is_call_graph_empty());
    }
}
