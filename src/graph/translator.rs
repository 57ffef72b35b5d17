//! Translation of the analyzer's raw graph into a partial call graph.
//!
//! One pass over the nodes assigns per-declaring-type method IDs, a second
//! pass over the edges records calls. The output depends only on the node
//! list order (first encounter assigns the ID), never on edge order.

use crate::errors::{CgError, CgResult};
use crate::graph::partial::PartialCallGraph;
use crate::graph::raw::{RawCallGraph, RawNode};
use crate::revision::MethodId;
use crate::uri::JavaType;
use rustc_hash::FxHashMap;
use tracing::debug;

pub fn translate(raw: &RawCallGraph) -> CgResult<PartialCallGraph> {
    let mut pcg = PartialCallGraph::new();

    // Per-node local IDs; only nodes of the analyzed artifact get one. Even
    // methods never exercised as caller or callee enter the class hierarchy.
    let mut ids: FxHashMap<usize, MethodId> = FxHashMap::default();
    for (index, node) in raw.nodes.iter().enumerate() {
        if let RawNode::Internal(sig) = node {
            let uri = sig.method_uri()?;
            let id = pcg.add_method(sig.type_uri(), uri);
            ids.insert(index, id);
        }
    }

    for info in &raw.hierarchy {
        let type_uri = JavaType::object(&info.type_name).fragment();
        let superclasses = info
            .superclasses
            .iter()
            .map(|name| JavaType::object(name).fragment())
            .collect();
        let interfaces = info
            .interfaces
            .iter()
            .map(|name| JavaType::object(name).fragment())
            .collect();
        pcg.set_supertypes(&type_uri, superclasses, interfaces);
    }

    for edge in &raw.edges {
        if edge.caller >= raw.nodes.len() || edge.callee >= raw.nodes.len() {
            return Err(CgError::MalformedInput(format!(
                "edge ({}, {}) references a node out of range",
                edge.caller, edge.callee
            )));
        }

        // Edges must originate within the analyzed artifact.
        let Some(&caller_id) = ids.get(&edge.caller) else {
            continue;
        };

        match &raw.nodes[edge.callee] {
            RawNode::Internal(_) => {
                let callee_id = *ids.get(&edge.callee).ok_or_else(|| {
                    CgError::MalformedInput(format!(
                        "internal node {} was never assigned an ID",
                        edge.callee
                    ))
                })?;
                pcg.add_internal_call(caller_id, callee_id);
            }
            RawNode::External(sig) => {
                pcg.add_external_call(caller_id, sig.method_uri()?, edge.kind);
            }
        }
    }

    debug!(
        "Translated {} nodes / {} edges into {} hierarchy types",
        raw.nodes.len(),
        raw.edges.len(),
        pcg.class_hierarchy().len()
    );

    Ok(pcg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::raw::{CallKind, MethodSignature, RawEdge, RawTypeInfo};

    fn internal(class: &str, method: &str) -> RawNode {
        RawNode::Internal(MethodSignature::new(class, method, "()V"))
    }

    fn external(class: &str, method: &str) -> RawNode {
        RawNode::External(MethodSignature::new(class, method, "()V"))
    }

    fn edge(caller: usize, callee: usize, kind: CallKind) -> RawEdge {
        RawEdge {
            caller,
            callee,
            kind,
        }
    }

    /// The single-source-to-target shape: a constructor calling
    /// `java.lang.Object.<init>` plus one internal source-to-target call.
    fn single_source_to_target() -> RawCallGraph {
        RawCallGraph {
            nodes: vec![
                internal("name/space/SingleSourceToTarget", "<init>"),
                internal("name/space/SingleSourceToTarget", "sourceMethod"),
                internal("name/space/SingleSourceToTarget", "targetMethod"),
                external("java/lang/Object", "<init>"),
            ],
            edges: vec![
                edge(0, 3, CallKind::Special),
                edge(1, 2, CallKind::Virtual),
            ],
            hierarchy: vec![],
        }
    }

    #[test]
    fn test_single_source_to_target() {
        let pcg = translate(&single_source_to_target()).unwrap();
        let graph = pcg.graph();

        assert_eq!(graph.internal_calls.len(), 1);
        assert_eq!(graph.external_calls.len(), 1);

        let cha = pcg.class_hierarchy();
        let methods = &cha["/name.space/SingleSourceToTarget"].methods;
        let (caller, callee) = graph.internal_calls[0];
        assert_eq!(
            methods[&caller].to_string(),
            "/name.space/SingleSourceToTarget.sourceMethod()%2Fjava.lang%2FVoidType"
        );
        assert_eq!(
            methods[&callee].to_string(),
            "/name.space/SingleSourceToTarget.targetMethod()%2Fjava.lang%2FVoidType"
        );

        let (key, metadata) = graph.external_calls.iter().next().unwrap();
        assert!(key.ends_with("/java.lang/Object.Object()%2Fjava.lang%2FVoidType"));
        assert_eq!(metadata["invokespecial"], "1");
    }

    #[test]
    fn test_duplicate_internal_edges_collapse() {
        let mut raw = single_source_to_target();
        raw.edges.push(edge(1, 2, CallKind::Virtual));
        raw.edges.push(edge(1, 2, CallKind::Special));

        let pcg = translate(&raw).unwrap();
        assert_eq!(pcg.graph().internal_calls.len(), 1);
    }

    #[test]
    fn test_repeated_external_calls_count() {
        let mut raw = single_source_to_target();
        raw.edges.push(edge(0, 3, CallKind::Special));
        raw.edges.push(edge(0, 3, CallKind::Virtual));

        let pcg = translate(&raw).unwrap();
        let graph = pcg.graph();
        assert_eq!(graph.external_calls.len(), 1);
        let metadata = graph.external_calls.values().next().unwrap();
        assert_eq!(metadata["invokespecial"], "2");
        assert_eq!(metadata["invokevirtual"], "1");
    }

    #[test]
    fn test_external_callers_are_skipped() {
        let raw = RawCallGraph {
            nodes: vec![
                external("java/lang/Object", "toString"),
                internal("a/B", "m"),
            ],
            edges: vec![edge(0, 1, CallKind::Virtual)],
            hierarchy: vec![],
        };

        let pcg = translate(&raw).unwrap();
        assert!(pcg.is_empty());
        // The internal method still enters the hierarchy.
        assert_eq!(pcg.class_hierarchy()["/a/B"].methods.len(), 1);
    }

    #[test]
    fn test_uncalled_methods_populate_hierarchy() {
        let raw = RawCallGraph {
            nodes: vec![internal("a/B", "unused")],
            edges: vec![],
            hierarchy: vec![],
        };

        let pcg = translate(&raw).unwrap();
        assert!(pcg.is_empty());
        assert_eq!(pcg.class_hierarchy()["/a/B"].methods.len(), 1);
    }

    #[test]
    fn test_edge_order_does_not_change_output() {
        let mut forward = single_source_to_target();
        forward.edges.push(edge(2, 3, CallKind::Special));

        let mut reversed = forward.clone();
        reversed.edges.reverse();

        let a = translate(&forward).unwrap();
        let b = translate(&reversed).unwrap();

        assert_eq!(a.graph().internal_calls, b.graph().internal_calls);
        let a_keys: Vec<_> = a.graph().external_calls.keys().cloned().collect();
        let mut b_keys: Vec<_> = b.graph().external_calls.keys().cloned().collect();
        b_keys.sort();
        let mut a_sorted = a_keys.clone();
        a_sorted.sort();
        assert_eq!(a_sorted, b_keys);
        assert_eq!(a.class_hierarchy(), b.class_hierarchy());
    }

    #[test]
    fn test_out_of_range_edge_is_malformed() {
        let raw = RawCallGraph {
            nodes: vec![internal("a/B", "m")],
            edges: vec![edge(0, 7, CallKind::Virtual)],
            hierarchy: vec![],
        };
        assert_eq!(translate(&raw).unwrap_err().kind(), "MalformedInput");
    }

    #[test]
    fn test_supertypes_from_hierarchy_info() {
        let mut raw = single_source_to_target();
        raw.hierarchy.push(RawTypeInfo {
            type_name: "name/space/SingleSourceToTarget".to_string(),
            superclasses: vec!["java/lang/Object".to_string()],
            interfaces: vec![],
        });

        let pcg = translate(&raw).unwrap();
        let record = &pcg.class_hierarchy()["/name.space/SingleSourceToTarget"];
        assert_eq!(
            record.superclasses.as_deref(),
            Some(&["/java.lang/Object".to_string()][..])
        );
    }
}
