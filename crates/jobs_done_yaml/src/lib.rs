//! Loader for `.jobs_done.yaml` documents
//!
//! This crate turns YAML text into a [`RawDocument`]: an ordered tree of scalars, lists and
//! mappings in which every scalar is kept as a string and every node remembers its source
//! [`Span`]. The resolver in `jobs_done_job` works on this tree.
//!
//! # Example
//!
//! ```rust
//! use jobs_done_yaml::{load_document, ValueKind};
//!
//! let doc = load_document(r#"
//! matrix:
//!   planet: [mercury, venus]
//! build_batch_commands:
//!   - "echo {planet}"
//! "#).unwrap();
//!
//! assert_eq!(doc.get("matrix").unwrap().kind(), ValueKind::Map);
//! ```

pub mod error;
pub mod helpers;
pub mod value;
pub mod yaml;

pub use error::{ParseError, ParseResult};
#[cfg(feature = "miette")]
pub use error::{WithSource, span_to_source_span};
pub use helpers::{get_span, parse_bool};
pub use marked_yaml::Span;
pub use value::{RawDocument, RawList, RawMapping, RawScalar, RawValue, ValueKind};
pub use yaml::{load_document, load_document_file, parse_yaml};
