//! Canonical FASTEN URI encoding and decoding for Java types and methods.
//!
//! A method is addressed as
//! `/{namespace}/{TypeName}.{methodName}({param,param,...})returnType`, where
//! every parameter/return fragment is itself a type URI (`/namespace/Name`, plus
//! `[]` per array dimension) percent-escaped exactly one level so it can be
//! embedded in the enclosing string. Encoding is injective and
//! `MethodUri::from_str` recovers every component exactly.

use crate::errors::{CgError, CgResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Namespace holding the FASTEN spellings of JVM primitive types.
const PRIMITIVE_NAMESPACE: &str = "java.lang";

/// Fixed literal spellings for JVM primitives, keyed by descriptor character.
const PRIMITIVES: &[(char, &str)] = &[
    ('V', "VoidType"),
    ('Z', "BooleanType"),
    ('B', "ByteType"),
    ('C', "CharType"),
    ('S', "ShortType"),
    ('I', "IntType"),
    ('J', "LongType"),
    ('F', "FloatType"),
    ('D', "DoubleType"),
];

/// A Java type reference: package namespace, simple class name, and array depth.
///
/// Primitives are ordinary entries in the `java.lang` namespace (`IntType`,
/// `VoidType`, ...), so the whole reference space is uniform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JavaType {
    pub namespace: String,
    pub name: String,
    pub array_dims: usize,
}

impl JavaType {
    /// Reference type from a binary class name, internal (`java/lang/Object`)
    /// or dotted (`java.lang.Object`). Classes in the default package get an
    /// empty namespace.
    pub fn object(binary_name: &str) -> Self {
        let dotted = binary_name.replace('/', ".");
        match dotted.rfind('.') {
            Some(split) => Self {
                namespace: dotted[..split].to_string(),
                name: dotted[split + 1..].to_string(),
                array_dims: 0,
            },
            None => Self {
                namespace: String::new(),
                name: dotted,
                array_dims: 0,
            },
        }
    }

    /// Primitive type from its descriptor character, if known.
    pub fn primitive(descriptor: char) -> Option<Self> {
        PRIMITIVES
            .iter()
            .find(|(c, _)| *c == descriptor)
            .map(|(_, name)| Self {
                namespace: PRIMITIVE_NAMESPACE.to_string(),
                name: (*name).to_string(),
                array_dims: 0,
            })
    }

    /// The unescaped type URI fragment, e.g. `/java.lang/IntType[]`.
    pub fn fragment(&self) -> String {
        let mut out = format!("/{}/{}", self.namespace, self.name);
        for _ in 0..self.array_dims {
            out.push_str("[]");
        }
        out
    }

    /// Parse an unescaped fragment back into its components.
    pub fn parse_fragment(fragment: &str) -> CgResult<Self> {
        let mut rest = fragment;
        let mut array_dims = 0;
        while let Some(stripped) = rest.strip_suffix("[]") {
            rest = stripped;
            array_dims += 1;
        }

        let body = rest.strip_prefix('/').ok_or_else(|| {
            CgError::MalformedInput(format!("type fragment missing leading '/': {fragment}"))
        })?;
        let split = body.rfind('/').ok_or_else(|| {
            CgError::MalformedInput(format!("type fragment missing namespace: {fragment}"))
        })?;
        let name = &body[split + 1..];
        if name.is_empty() {
            return Err(CgError::MalformedInput(format!(
                "type fragment missing name: {fragment}"
            )));
        }

        Ok(Self {
            namespace: body[..split].to_string(),
            name: name.to_string(),
            array_dims,
        })
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fragment())
    }
}

/// Parse a JVM method descriptor, e.g. `(Ljava/lang/String;I)V`, into
/// parameter types and a return type.
pub fn parse_method_descriptor(descriptor: &str) -> CgResult<(Vec<JavaType>, JavaType)> {
    let inner = descriptor.strip_prefix('(').ok_or_else(|| {
        CgError::MalformedInput(format!("method descriptor missing '(': {descriptor}"))
    })?;
    let close = inner.find(')').ok_or_else(|| {
        CgError::MalformedInput(format!("method descriptor missing ')': {descriptor}"))
    })?;

    let mut params = Vec::new();
    let mut cursor = &inner[..close];
    while !cursor.is_empty() {
        let (ty, rest) = parse_field_descriptor(cursor, descriptor)?;
        params.push(ty);
        cursor = rest;
    }

    let (ret, rest) = parse_field_descriptor(&inner[close + 1..], descriptor)?;
    if !rest.is_empty() {
        return Err(CgError::MalformedInput(format!(
            "trailing characters in method descriptor: {descriptor}"
        )));
    }

    Ok((params, ret))
}

/// Parse one field descriptor off the front of `input`, returning the type and
/// the remaining input.
fn parse_field_descriptor<'a>(input: &'a str, whole: &str) -> CgResult<(JavaType, &'a str)> {
    let mut dims = 0;
    let mut rest = input;
    while let Some(stripped) = rest.strip_prefix('[') {
        rest = stripped;
        dims += 1;
    }

    let first = rest.chars().next().ok_or_else(|| {
        CgError::MalformedInput(format!("truncated type in descriptor: {whole}"))
    })?;

    if first == 'L' {
        let end = rest.find(';').ok_or_else(|| {
            CgError::MalformedInput(format!("unterminated class type in descriptor: {whole}"))
        })?;
        let mut ty = JavaType::object(&rest[1..end]);
        ty.array_dims = dims;
        return Ok((ty, &rest[end + 1..]));
    }

    let mut ty = JavaType::primitive(first).ok_or_else(|| {
        CgError::MalformedInput(format!("unknown type token '{first}' in descriptor: {whole}"))
    })?;
    ty.array_dims = dims;
    Ok((ty, &rest[first.len_utf8()..]))
}

/// Escape a type fragment for embedding inside a method URI: `%` then `/`,
/// exactly one level.
fn escape(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        match c {
            '%' => out.push_str("%25"),
            '/' => out.push_str("%2F"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse one level of percent-escaping.
fn unescape(escaped: &str) -> CgResult<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let hex = escaped.get(i + 1..i + 3).ok_or_else(|| {
            CgError::MalformedInput(format!("truncated escape sequence in: {escaped}"))
        })?;
        let byte = u8::from_str_radix(hex, 16).map_err(|_| {
            CgError::MalformedInput(format!("invalid escape sequence %{hex} in: {escaped}"))
        })?;
        out.push(byte as char);
        // Skip the two hex digits just consumed.
        chars.next();
        chars.next();
    }
    Ok(out)
}

/// Canonical identifier for one Java method.
///
/// Equality and hashing are defined on the decoded tuple; the canonical string
/// form is produced by `Display` and recovered by `FromStr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodUri {
    pub namespace: String,
    pub type_name: String,
    pub method_name: String,
    pub params: Vec<JavaType>,
    pub ret: JavaType,
}

impl MethodUri {
    pub fn new(
        namespace: impl Into<String>,
        type_name: impl Into<String>,
        method_name: impl Into<String>,
        params: Vec<JavaType>,
        ret: JavaType,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            type_name: type_name.into(),
            method_name: method_name.into(),
            params,
            ret,
        }
    }

    /// URI of the declaring type, e.g. `/name.space/SingleSourceToTarget`.
    pub fn type_uri(&self) -> String {
        format!("/{}/{}", self.namespace, self.type_name)
    }
}

impl fmt::Display for MethodUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|p| escape(&p.fragment()))
            .collect::<Vec<_>>()
            .join(",");
        write!(
            f,
            "/{}/{}.{}({}){}",
            self.namespace,
            self.type_name,
            self.method_name,
            params,
            escape(&self.ret.fragment())
        )
    }
}

impl FromStr for MethodUri {
    type Err = CgError;

    fn from_str(s: &str) -> CgResult<Self> {
        let body = s.strip_prefix('/').ok_or_else(|| {
            CgError::MalformedInput(format!("method URI missing leading '/': {s}"))
        })?;

        let open = body.find('(').ok_or_else(|| {
            CgError::MalformedInput(format!("method URI missing parameter list: {s}"))
        })?;
        let (head, tail) = (&body[..open], &body[open + 1..]);

        let slash = head.rfind('/').ok_or_else(|| {
            CgError::MalformedInput(format!("method URI missing namespace: {s}"))
        })?;
        let namespace = &head[..slash];
        let qualified = &head[slash + 1..];

        let dot = qualified.find('.').ok_or_else(|| {
            CgError::MalformedInput(format!("method URI missing '.' separator: {s}"))
        })?;
        let (type_name, method_name) = (&qualified[..dot], &qualified[dot + 1..]);
        if type_name.is_empty() || method_name.is_empty() {
            return Err(CgError::MalformedInput(format!(
                "method URI missing type or method name: {s}"
            )));
        }

        let close = tail.find(')').ok_or_else(|| {
            CgError::MalformedInput(format!("unbalanced parameter list in method URI: {s}"))
        })?;
        let (param_list, ret_part) = (&tail[..close], &tail[close + 1..]);
        if ret_part.is_empty() {
            return Err(CgError::MalformedInput(format!(
                "method URI missing return type: {s}"
            )));
        }

        let mut params = Vec::new();
        if !param_list.is_empty() {
            for raw in param_list.split(',') {
                params.push(JavaType::parse_fragment(&unescape(raw)?)?);
            }
        }
        let ret = JavaType::parse_fragment(&unescape(ret_part)?)?;

        Ok(Self {
            namespace: namespace.to_string(),
            type_name: type_name.to_string(),
            method_name: method_name.to_string(),
            params,
            ret,
        })
    }
}

impl Serialize for MethodUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MethodUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
