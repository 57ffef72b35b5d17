//! Raw call graph as reported by the external analyzer.
//!
//! This is the wire format at the analyzer boundary: nodes are methods tagged
//! by whether they belong to the analyzed artifact, edges carry the
//! invocation-instruction kind of the call site.

use crate::errors::CgResult;
use crate::uri::{parse_method_descriptor, JavaType, MethodUri};
use serde::{Deserialize, Serialize};

/// Invocation-instruction kind at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    #[serde(rename = "invokevirtual")]
    Virtual,
    #[serde(rename = "invokespecial")]
    Special,
    #[serde(rename = "invokestatic")]
    Static,
    #[serde(rename = "invokeinterface")]
    Interface,
    #[serde(rename = "invokedynamic")]
    Dynamic,
}

impl CallKind {
    pub fn label(&self) -> &'static str {
        match self {
            CallKind::Virtual => "invokevirtual",
            CallKind::Special => "invokespecial",
            CallKind::Static => "invokestatic",
            CallKind::Interface => "invokeinterface",
            CallKind::Dynamic => "invokedynamic",
        }
    }
}

/// Fully-qualified method signature as the analyzer reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Declaring class, internal (`name/space/Class`) or dotted binary name.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "method")]
    pub method_name: String,
    /// JVM method descriptor, e.g. `(Ljava/lang/String;I)V`.
    pub descriptor: String,
}

impl MethodSignature {
    pub fn new(
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            descriptor: descriptor.into(),
        }
    }

    pub fn declaring_type(&self) -> JavaType {
        JavaType::object(&self.type_name)
    }

    /// URI of the declaring type, e.g. `/name.space/SingleSourceToTarget`.
    pub fn type_uri(&self) -> String {
        self.declaring_type().fragment()
    }

    /// Encode this signature as a canonical method URI. Constructors take the
    /// class name; class initializers keep an escaped spelling since `<` and
    /// `>` have no place in the URI grammar.
    pub fn method_uri(&self) -> CgResult<MethodUri> {
        let (params, ret) = parse_method_descriptor(&self.descriptor)?;
        let declaring = self.declaring_type();
        let method_name = match self.method_name.as_str() {
            "<init>" => declaring.name.clone(),
            "<clinit>" => "%3Cclinit%3E".to_string(),
            other => other.to_string(),
        };
        Ok(MethodUri::new(
            declaring.namespace,
            declaring.name,
            method_name,
            params,
            ret,
        ))
    }
}

/// A method node, tagged by origin: part of the analyzed artifact, or part of
/// a dependency / the platform runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum RawNode {
    Internal(MethodSignature),
    External(MethodSignature),
}

impl RawNode {
    pub fn signature(&self) -> &MethodSignature {
        match self {
            RawNode::Internal(sig) | RawNode::External(sig) => sig,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, RawNode::Internal(_))
    }
}

/// A directed call edge between two node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEdge {
    pub caller: usize,
    pub callee: usize,
    pub kind: CallKind,
}

/// Supertype information for one analyzed type, when the analyzer exposes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTypeInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub superclasses: Vec<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
}

/// The complete analyzer output for one artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCallGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
    #[serde(default)]
    pub hierarchy: Vec<RawTypeInfo>,
}
