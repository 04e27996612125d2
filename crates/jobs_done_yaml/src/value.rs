//! The untyped document model: scalars, lists and mappings, with spans.
//!
//! Every scalar is kept in its source string form. A YAML `1` and a YAML `"1"` both end up
//! as the scalar `"1"`, which is what downstream consumers (shell commands, patterns) want.

use std::fmt;

use marked_yaml::{Node, Span, types::MarkedMappingNode};

use crate::helpers::get_span;

/// The shape of a value in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    List,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Scalar => write!(f, "scalar"),
            ValueKind::List => write!(f, "list"),
            ValueKind::Map => write!(f, "mapping"),
        }
    }
}

/// A scalar string with the place it came from
#[derive(Debug, Clone)]
pub struct RawScalar {
    value: String,
    span: Span,
}

impl RawScalar {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl fmt::Display for RawScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// An ordered sequence
#[derive(Debug, Clone)]
pub struct RawList {
    items: Vec<RawValue>,
    span: Span,
}

impl RawList {
    pub fn new(items: Vec<RawValue>, span: Span) -> Self {
        Self { items, span }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawValue> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// A mapping that keeps its keys in declaration order
#[derive(Debug, Clone)]
pub struct RawMapping {
    entries: Vec<(RawScalar, RawValue)>,
    span: Span,
}

impl RawMapping {
    pub fn new(entries: Vec<(RawScalar, RawValue)>, span: Span) -> Self {
        Self { entries, span }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Span::new_blank())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RawScalar, &RawValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Look up the value stored under exactly `key`
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    fn from_marked(mapping: &MarkedMappingNode) -> Self {
        let entries = mapping
            .iter()
            .map(|(key, value)| {
                (
                    RawScalar::new(key.as_str(), *key.span()),
                    RawValue::from_node(value),
                )
            })
            .collect();
        Self::new(entries, *mapping.span())
    }
}

/// A node of the document
#[derive(Debug, Clone)]
pub enum RawValue {
    Scalar(RawScalar),
    List(RawList),
    Map(RawMapping),
}

impl RawValue {
    pub fn from_node(node: &Node) -> Self {
        match node {
            Node::Scalar(scalar) => {
                RawValue::Scalar(RawScalar::new(scalar.as_str(), *scalar.span()))
            }
            Node::Sequence(sequence) => RawValue::List(RawList::new(
                sequence.iter().map(RawValue::from_node).collect(),
                get_span(node),
            )),
            Node::Mapping(mapping) => RawValue::Map(RawMapping::from_marked(mapping)),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            RawValue::Scalar(_) => ValueKind::Scalar,
            RawValue::List(_) => ValueKind::List,
            RawValue::Map(_) => ValueKind::Map,
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            RawValue::Scalar(s) => s.span(),
            RawValue::List(l) => l.span(),
            RawValue::Map(m) => m.span(),
        }
    }

    pub fn as_scalar(&self) -> Option<&RawScalar> {
        match self {
            RawValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&RawList> {
        match self {
            RawValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&RawMapping> {
        match self {
            RawValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// A loaded jobs document. The top level is always a mapping; an empty file is an empty
/// mapping.
#[derive(Debug, Clone)]
pub struct RawDocument {
    root: RawMapping,
}

impl RawDocument {
    pub fn new(root: RawMapping) -> Self {
        Self { root }
    }

    pub fn empty() -> Self {
        Self::new(RawMapping::empty())
    }

    pub fn root(&self) -> &RawMapping {
        &self.root
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.root.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub(crate) fn from_marked(mapping: &MarkedMappingNode) -> Self {
        Self::new(RawMapping::from_marked(mapping))
    }
}
