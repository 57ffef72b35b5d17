//! The raw analyzer output model and its translation into the canonical
//! partial call graph.

pub mod analyzer;
pub mod partial;
pub mod raw;
pub mod translator;

pub use analyzer::{CallGraphBuilder, ExternalAnalyzer};
pub use partial::PartialCallGraph;
pub use raw::{CallKind, MethodSignature, RawCallGraph, RawEdge, RawNode};
pub use translator::translate;
