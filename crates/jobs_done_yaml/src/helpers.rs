//! Helper functions for YAML parsing

use marked_yaml::{Node as MarkedNode, Span};

/// Get the span from a marked_yaml node
pub fn get_span(node: &MarkedNode) -> Span {
    match node {
        MarkedNode::Scalar(s) => *s.span(),
        MarkedNode::Mapping(m) => *m.span(),
        MarkedNode::Sequence(s) => *s.span(),
    }
}

/// Interpret a scalar as a YAML 1.1 boolean.
///
/// Documents are loaded without type coercion, so `exclude: yes` arrives as the string
/// `"yes"`. Returns `None` for anything that is not a recognized boolean spelling.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "y" | "1" => Some(true),
        "false" | "no" | "off" | "n" | "0" => Some(false),
        _ => None,
    }
}
