//! Error types for loading jobs documents

use std::{path::PathBuf, sync::Arc};

use marked_yaml::{LoadError, Marker};
use thiserror::Error;

#[cfg(feature = "miette")]
use marked_yaml::Span;
#[cfg(feature = "miette")]
use miette::{Diagnostic, SourceSpan};

/// Result type for loading operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while turning YAML text into a [`crate::RawDocument`]
#[derive(Debug, Error, Clone)]
pub enum ParseError {
    /// IO error when reading a file
    #[error("IO error while reading file {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        source: Arc<std::io::Error>,
    },

    /// The text is not valid YAML, or not shaped as a document (top level must be a mapping,
    /// keys must be scalars, keys must be unique)
    #[error("failed to parse YAML: {message}")]
    Yaml {
        message: String,
        marker: Option<Marker>,
    },
}

impl ParseError {
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        Self::IoError {
            path,
            source: Arc::new(source),
        }
    }

    /// The position in the source the error points at, if any
    pub fn marker(&self) -> Option<&Marker> {
        match self {
            Self::Yaml { marker, .. } => marker.as_ref(),
            Self::IoError { .. } => None,
        }
    }
}

/// The position a loader error points at. For duplicate keys this is the second key.
fn load_error_marker(err: &LoadError) -> Option<Marker> {
    use LoadError::*;
    match err {
        TopLevelMustBeMapping(m)
        | TopLevelMustBeSequence(m)
        | UnexpectedAnchor(m)
        | MappingKeyMustBeScalar(m)
        | UnexpectedTag(m)
        | ScanError(m, _) => Some(*m),
        DuplicateKey(inner) => inner.key.span().start().copied(),
    }
}

impl From<LoadError> for ParseError {
    fn from(err: LoadError) -> Self {
        Self::Yaml {
            marker: load_error_marker(&err),
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "miette")]
impl Diagnostic for ParseError {
    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let marker = self.marker()?;
        let label = miette::LabeledSpan::new_with_span(
            Some("here".to_string()),
            SourceSpan::new(marker.character().into(), 1),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Convert a marked_yaml [`Span`] into a miette [`SourceSpan`]
#[cfg(feature = "miette")]
pub fn span_to_source_span(span: &Span) -> SourceSpan {
    if let Some(start) = span.start() {
        let offset = start.character();
        let len = if let Some(end) = span.end() {
            end.character().saturating_sub(offset).max(1)
        } else {
            1
        };
        SourceSpan::new(offset.into(), len)
    } else {
        SourceSpan::new(0.into(), 0)
    }
}

/// Find the length of a YAML token starting at the given offset
#[cfg(feature = "miette")]
fn find_token_length(src: &str, start: usize) -> usize {
    let Some(remaining) = src.get(start..) else {
        return 1;
    };
    let mut len = 0;

    for (i, ch) in remaining.char_indices() {
        // a condition key may contain `-` and `.`, so only stop at structural characters
        let ends_key =
            ch == ':' && remaining[i + 1..].chars().next().is_none_or(char::is_whitespace);
        if ch.is_whitespace() || ch == ',' || ends_key {
            return if len == 0 { i.max(1) } else { len };
        }
        len = i + ch.len_utf8();
    }

    if len == 0 {
        remaining.len().max(1)
    } else {
        len
    }
}

/// Wrapper that pairs any diagnostic from the jobs crates with the document text it refers
/// to, so that miette can render annotated snippets.
///
/// Single-character labels are widened to cover the whole YAML token they start.
#[cfg(feature = "miette")]
#[derive(Debug)]
pub struct WithSource<S, E> {
    source: S,
    error: E,
}

#[cfg(feature = "miette")]
impl<S, E> WithSource<S, E> {
    pub fn new(source: S, error: E) -> Self {
        Self { source, error }
    }

    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn into_error(self) -> E {
        self.error
    }
}

#[cfg(feature = "miette")]
impl<S, E: std::fmt::Display> std::fmt::Display for WithSource<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

#[cfg(feature = "miette")]
impl<S, E> std::error::Error for WithSource<S, E>
where
    S: std::fmt::Debug,
    E: std::error::Error,
{
}

#[cfg(feature = "miette")]
impl<S, E> Diagnostic for WithSource<S, E>
where
    S: AsRef<str> + miette::SourceCode + std::fmt::Debug,
    E: Diagnostic,
{
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.error.code()
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let labels = self.error.labels()?;
        let source_str = self.source.as_ref();

        let expanded = labels.map(move |label| {
            let span = label.inner();
            if span.len() == 1 && span.offset() < source_str.len() {
                let offset = span.offset();
                let token_len = find_token_length(source_str, offset);
                miette::LabeledSpan::new(label.label().map(|s| s.to_string()), offset, token_len)
            } else {
                label
            }
        });
        Some(Box::new(expanded))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.error.help()
    }
}
