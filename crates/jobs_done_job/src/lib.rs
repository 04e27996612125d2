//! Job matrix expansion and conditional option resolution for `.jobs_done.yaml` documents
//!
//! A document declares build options, a `matrix` of axes, and conditional keys such as
//! `platform-windows:build_batch_commands` that only apply to some matrix rows. This crate
//! expands the matrix, applies `exclude` rules, resolves the conditional keys for every row,
//! replaces `{placeholders}` and returns one [`ResolvedJob`] per surviving row.
//!
//! # Example
//!
//! ```rust
//! use jobs_done_job::{Repository, Value, resolve_str};
//!
//! let repository = Repository::new("https://example.com/space.git", "milky_way");
//! let jobs = resolve_str(r#"
//! matrix:
//!   planet: [mercury, venus]
//!   moon: [europa]
//! build_batch_commands:
//!   - "cmd on {planet}"
//! "#, &repository).unwrap();
//!
//! assert_eq!(jobs.len(), 2);
//! assert_eq!(
//!     jobs[1].option("build_batch_commands"),
//!     Some(&Value::from(vec!["cmd on venus"]))
//! );
//! ```

pub mod condition;
pub mod error;
pub mod job;
pub mod matrix;
pub mod repository;
pub mod resolver;
pub mod schema;
pub mod substitution;
pub mod value;

use jobs_done_yaml::{RawDocument, load_document};

pub use error::{JobsDoneError, ResolveError};
pub use job::ResolvedJob;
pub use repository::Repository;
pub use resolver::JobTemplate;
pub use value::Value;

/// Resolve a loaded document into jobs for a repository
pub fn resolve(
    document: &RawDocument,
    repository: &Repository,
) -> Result<Vec<ResolvedJob>, ResolveError> {
    let template = JobTemplate::new(document)?;
    let jobs = template.jobs(repository)?;
    tracing::debug!(
        "resolved {} job(s) for {} on branch '{}'",
        jobs.len(),
        repository.name,
        repository.branch
    );
    Ok(jobs)
}

/// Load YAML text and resolve it into jobs for a repository
pub fn resolve_str(
    source: &str,
    repository: &Repository,
) -> Result<Vec<ResolvedJob>, JobsDoneError> {
    let document = load_document(source)?;
    Ok(resolve(&document, repository)?)
}
