//! The table of options a jobs document may set, and the shape each one takes

use jobs_done_yaml::{RawValue, Span, ValueKind};

use crate::error::ResolveError;

/// Declares the build matrix. Never conditioned, never emitted as an option.
pub const MATRIX: &str = "matrix";
/// Removes matrix rows. Consumed by the expander.
pub const EXCLUDE: &str = "exclude";
/// Turns unmatchable conditions into silently dropped entries.
pub const IGNORE_UNMATCHABLE: &str = "ignore_unmatchable";
/// Restricts the branches a job is produced for.
pub const BRANCH_PATTERNS: &str = "branch_patterns";

/// Whether a top-level key is a known option or a free-form variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionCategory {
    Core,
    Variable,
}

/// A known option and the value shapes it accepts
#[derive(Debug)]
pub struct OptionSpec {
    pub name: &'static str,
    pub accepted: &'static [ValueKind],
}

impl OptionSpec {
    pub fn accepts(&self, kind: ValueKind) -> bool {
        self.accepted.contains(&kind)
    }
}

const LIST: &[ValueKind] = &[ValueKind::List];
const SCALAR: &[ValueKind] = &[ValueKind::Scalar];
const MAP: &[ValueKind] = &[ValueKind::Map];
const SCALAR_OR_MAP: &[ValueKind] = &[ValueKind::Scalar, ValueKind::Map];

const fn spec(name: &'static str, accepted: &'static [ValueKind]) -> OptionSpec {
    OptionSpec { name, accepted }
}

/// Every core option, sorted by name
pub static OPTION_SCHEMA: &[OptionSpec] = &[
    spec("additional_repositories", LIST),
    spec("boosttest_patterns", LIST),
    spec(BRANCH_PATTERNS, LIST),
    spec("build_batch_commands", LIST),
    spec("build_python_commands", LIST),
    spec("build_shell_commands", LIST),
    spec("cron", SCALAR),
    spec("custom_workspace", SCALAR),
    spec("description_regex", SCALAR),
    spec("display_name", SCALAR),
    spec("email_notification", SCALAR_OR_MAP),
    spec(EXCLUDE, SCALAR),
    spec("git", MAP),
    spec(IGNORE_UNMATCHABLE, SCALAR),
    spec("junit_patterns", LIST),
    spec("label_expression", SCALAR),
    spec(MATRIX, MAP),
    spec("notify_stash", SCALAR_OR_MAP),
    spec("parameters", LIST),
    spec("scm_poll", SCALAR),
    spec("timeout", SCALAR),
];

/// Look up a core option by name
pub fn lookup(name: &str) -> Option<&'static OptionSpec> {
    OPTION_SCHEMA.iter().find(|spec| spec.name == name)
}

/// Check a top-level entry against the schema.
///
/// `span` is the location of the key, used when the option itself is unknown.
pub fn classify(
    option: &str,
    value: &RawValue,
    span: Span,
) -> Result<OptionCategory, ResolveError> {
    let kind = value.kind();
    match lookup(option) {
        Some(spec) if spec.accepts(kind) => Ok(OptionCategory::Core),
        Some(spec) => Err(ResolveError::TypeMismatch {
            option: option.to_string(),
            accepted: spec.accepted.to_vec(),
            actual: kind,
            span: *value.span(),
        }),
        None if kind == ValueKind::List => Ok(OptionCategory::Variable),
        None => Err(ResolveError::UnknownOption {
            option: option.to_string(),
            span,
        }),
    }
}
