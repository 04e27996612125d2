//! Error types for job resolution

use jobs_done_yaml::{ParseError, Span, ValueKind};
use thiserror::Error;

#[cfg(feature = "miette")]
use miette::Diagnostic;

#[cfg(feature = "miette")]
use crate::schema::OPTION_SCHEMA;

/// Errors that abort the resolution of a document. No partial job list is ever returned.
#[derive(Debug, Error, Clone)]
pub enum ResolveError {
    /// A top-level key that is neither a known option nor a list-valued variable
    #[error("unknown option '{option}'")]
    UnknownOption { option: String, span: Span },

    /// A known option supplied with the wrong shape
    #[error("option '{option}' accepts {} but a {actual} was given", describe_kinds(.accepted))]
    TypeMismatch {
        option: String,
        accepted: Vec<ValueKind>,
        actual: ValueKind,
        span: Span,
    },

    /// A condition that no entry of the matrix can ever satisfy
    #[error("condition '{key}' does not match any entry of the matrix")]
    UnmatchableCondition { key: String, span: Span },

    /// A `{placeholder}` with no matrix axis, variable or built-in to fill it
    #[error("no value for placeholder '{{{placeholder}}}' used in '{option}'")]
    MissingSubstitution { placeholder: String, option: String },

    /// A lone `{` or `}` in a value
    #[error(
        "unbalanced brace in '{option}': {text:?} (write '{{{{' or '}}}}' for a literal brace)"
    )]
    MalformedPlaceholder { option: String, text: String },

    /// A key that cannot be read as `axis-pattern:...:option`
    #[error("invalid condition '{key}': {reason}")]
    InvalidCondition {
        key: String,
        reason: String,
        span: Span,
    },

    /// A value with the right shape but unusable content
    #[error("invalid value for '{option}': {reason}")]
    InvalidValue {
        option: String,
        reason: String,
        span: Span,
    },

    /// Two rows whose values join into the same job name
    #[error("the jobs for rows [{first}] and [{second}] are both named '{name}'")]
    DuplicateJobName {
        name: String,
        first: String,
        second: String,
    },
}

fn describe_kinds(kinds: &[ValueKind]) -> String {
    let names: Vec<String> = kinds.iter().map(|kind| format!("a {kind}")).collect();
    names.join(" or ")
}

impl ResolveError {
    /// The place in the document the error points at, if it has one
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::UnknownOption { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::UnmatchableCondition { span, .. }
            | Self::InvalidCondition { span, .. }
            | Self::InvalidValue { span, .. } => Some(span),
            Self::MissingSubstitution { .. }
            | Self::MalformedPlaceholder { .. }
            | Self::DuplicateJobName { .. } => None,
        }
    }
}

#[cfg(feature = "miette")]
impl Diagnostic for ResolveError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let code = match self {
            Self::UnknownOption { .. } => "jobs_done::unknown_option",
            Self::TypeMismatch { .. } => "jobs_done::type_mismatch",
            Self::UnmatchableCondition { .. } => "jobs_done::unmatchable_condition",
            Self::MissingSubstitution { .. } => "jobs_done::missing_substitution",
            Self::MalformedPlaceholder { .. } => "jobs_done::malformed_placeholder",
            Self::InvalidCondition { .. } => "jobs_done::invalid_condition",
            Self::InvalidValue { .. } => "jobs_done::invalid_value",
            Self::DuplicateJobName { .. } => "jobs_done::duplicate_job_name",
        };
        Some(Box::new(code))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        let span = self.span()?;
        span.start()?;
        let message = match self {
            Self::UnknownOption { .. } => "unknown option".to_string(),
            Self::TypeMismatch { actual, .. } => format!("this is a {actual}"),
            Self::UnmatchableCondition { .. } => "never matches".to_string(),
            Self::InvalidCondition { reason, .. } | Self::InvalidValue { reason, .. } => {
                reason.clone()
            }
            Self::MissingSubstitution { .. }
            | Self::MalformedPlaceholder { .. }
            | Self::DuplicateJobName { .. } => {
                return None;
            }
        };
        let label = miette::LabeledSpan::new_with_span(
            Some(message),
            jobs_done_yaml::span_to_source_span(span),
        );
        Some(Box::new(std::iter::once(label)))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            Self::UnknownOption { .. } => {
                let known: Vec<_> = OPTION_SCHEMA.iter().map(|spec| spec.name).collect();
                Some(Box::new(format!(
                    "unknown keys are accepted as variables only when they hold a list. \
                     Known options are: {}",
                    known.join(", ")
                )))
            }
            Self::UnmatchableCondition { .. } => Some(Box::new(
                "check the axis name and pattern against `matrix`, \
                 or set `ignore_unmatchable: true`",
            )),
            Self::MissingSubstitution { .. } => Some(Box::new(
                "placeholders are filled from matrix axes, list variables, `name` and `branch`",
            )),
            Self::DuplicateJobName { .. } => Some(Box::new(
                "job names join the row values with '-', \
                 rename a matrix value so that the names differ",
            )),
            _ => None,
        }
    }
}

/// Either stage of turning text into jobs
#[derive(Debug, Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
pub enum JobsDoneError {
    #[error(transparent)]
    #[cfg_attr(feature = "miette", diagnostic(transparent))]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[cfg_attr(feature = "miette", diagnostic(transparent))]
    Resolve(#[from] ResolveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_names_every_accepted_kind() {
        let err = ResolveError::TypeMismatch {
            option: "email_notification".to_string(),
            accepted: vec![ValueKind::Scalar, ValueKind::Map],
            actual: ValueKind::List,
            span: Span::new_blank(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"option 'email_notification' accepts a scalar or a mapping but a list was given"
        );
    }

    #[test]
    fn placeholder_errors_render_braces() {
        let err = ResolveError::MissingSubstitution {
            placeholder: "planet".to_string(),
            option: "build_batch_commands[0]".to_string(),
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"no value for placeholder '{planet}' used in 'build_batch_commands[0]'"
        );
        assert!(err.span().is_none());
    }
}
