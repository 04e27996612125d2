//! Loading documents from YAML text
//!
//! Parsing goes through marked_yaml with `prevent_coercion(true)`, so every scalar keeps its
//! source spelling and can be handed to the resolver as a string.

use std::path::Path;

use marked_yaml::{LoadError, LoaderOptions, Marker, Node, parse_yaml_with_options};

use crate::{
    error::{ParseError, ParseResult},
    helpers::get_span,
    value::RawDocument,
};

/// Parse YAML text into a marked node tree, rejecting duplicate keys
pub fn parse_yaml(source: &str) -> Result<Node, marked_yaml::LoadError> {
    let options = LoaderOptions::default()
        .error_on_duplicate_keys(true)
        .prevent_coercion(true);

    parse_yaml_with_options(0, source, options)
}

/// True when the text holds nothing but blank lines and comments
fn is_blank_document(source: &str) -> bool {
    source.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Load a jobs document from YAML text.
///
/// Trailing whitespace (including tabs, which YAML forbids in some positions) is dropped
/// before parsing. Text without any content loads as an empty document.
pub fn load_document(source: &str) -> ParseResult<RawDocument> {
    let source = source.trim_end();
    if is_blank_document(source) {
        return Ok(RawDocument::empty());
    }

    // the loader only hands back mappings at the top level
    let node = parse_yaml(source)?;
    let Some(mapping) = node.as_mapping() else {
        let marker = get_span(&node)
            .start()
            .copied()
            .unwrap_or_else(|| Marker::new(0, 0, 1, 1));
        return Err(LoadError::TopLevelMustBeMapping(marker).into());
    };
    Ok(RawDocument::from_marked(mapping))
}

/// Read and load a jobs document from disk
pub fn load_document_file(path: &Path) -> ParseResult<RawDocument> {
    let source = fs_err::read_to_string(path)
        .map_err(|err| ParseError::io_error(path.to_path_buf(), err))?;
    load_document(&source)
}
