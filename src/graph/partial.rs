//! Accumulation model for one artifact's call graph.
//!
//! Single-owner during accumulation: the translator builds it in one pass and
//! hands the finished parts to the revision document, after which nothing
//! mutates them.

use crate::graph::raw::CallKind;
use crate::revision::{Graph, MethodId, TypeRecord};
use crate::uri::MethodUri;
use indexmap::{IndexMap, IndexSet};

/// Deduplicated internal calls, per-kind counters for external calls, and the
/// class hierarchy of every type observed for the analyzed artifact.
#[derive(Debug, Default)]
pub struct PartialCallGraph {
    internal_calls: IndexSet<(MethodId, MethodId)>,
    external_calls: IndexMap<(MethodId, MethodUri), IndexMap<CallKind, u64>>,
    class_hierarchy: IndexMap<String, TypeRecord>,
}

impl PartialCallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method declared by `type_uri`, assigning the next
    /// per-type sequential ID on first encounter.
    pub fn add_method(&mut self, type_uri: String, uri: MethodUri) -> MethodId {
        let record = self.class_hierarchy.entry(type_uri).or_default();
        if let Some((id, _)) = record.methods.iter().find(|(_, existing)| **existing == uri) {
            return *id;
        }
        let id = record.methods.len() as MethodId;
        record.methods.insert(id, uri);
        id
    }

    /// Attach supertype URIs to an already-registered type. Types the
    /// translator never saw a method for are not invented here.
    pub fn set_supertypes(
        &mut self,
        type_uri: &str,
        superclasses: Vec<String>,
        interfaces: Vec<String>,
    ) {
        if let Some(record) = self.class_hierarchy.get_mut(type_uri) {
            if !superclasses.is_empty() {
                record.superclasses = Some(superclasses);
            }
            if !interfaces.is_empty() {
                record.interfaces = Some(interfaces);
            }
        }
    }

    /// Record an internal call. The same directed pair is stored once no
    /// matter how many call sites realize it.
    pub fn add_internal_call(&mut self, caller: MethodId, callee: MethodId) {
        self.internal_calls.insert((caller, callee));
    }

    /// Record an external call, incrementing the counter for this call kind
    /// on the (caller, callee) pair.
    pub fn add_external_call(&mut self, caller: MethodId, callee: MethodUri, kind: CallKind) {
        *self
            .external_calls
            .entry((caller, callee))
            .or_default()
            .entry(kind)
            .or_insert(0) += 1;
    }

    /// True when no call of either kind was recorded.
    pub fn is_empty(&self) -> bool {
        self.internal_calls.is_empty() && self.external_calls.is_empty()
    }

    pub fn class_hierarchy(&self) -> &IndexMap<String, TypeRecord> {
        &self.class_hierarchy
    }

    /// Lower the accumulated calls into the serializable document graph.
    pub fn graph(&self) -> Graph {
        let internal_calls = self.internal_calls.iter().copied().collect();

        let mut external_calls = IndexMap::new();
        for ((caller, uri), kinds) in &self.external_calls {
            let mut metadata = IndexMap::new();
            for (kind, count) in kinds {
                metadata.insert(kind.label().to_string(), count.to_string());
            }
            external_calls.insert(format!("{caller},{uri}"), metadata);
        }

        Graph {
            internal_calls,
            external_calls,
        }
    }

    /// Consume the accumulator, yielding the class hierarchy and graph for
    /// the revision document.
    pub fn finish(self) -> (IndexMap<String, TypeRecord>, Graph) {
        let graph = self.graph();
        (self.class_hierarchy, graph)
    }
}
