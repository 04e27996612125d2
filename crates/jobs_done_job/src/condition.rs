//! Conditional keys: `axis-pattern:...:option`
//!
//! A key is split on `:`. The last segment names the option; every other segment is a
//! condition, split on its first `-` into the axis name and the pattern. All conditions of a
//! key must hold for the key to apply to a matrix row.
//!
//! The `branch` axis is built in: its pattern is tested against the repository branch
//! instead of a matrix value.
//!
//! Patterns are compiled with `fancy_regex`, so look-ahead and look-behind are available.
//! A pattern containing a look-around group is a guard on the start of the value
//! (`platform-(?!windows):...` applies to every platform but `windows`); any other pattern
//! must match the whole value.

use fancy_regex::Regex;
use jobs_done_yaml::{RawScalar, Span};

use crate::{error::ResolveError, matrix::MatrixRow};

/// The axis name that tests the repository branch
pub const BRANCH_AXIS: &str = "branch";

const LOOK_AROUND_GROUPS: [&str; 4] = ["(?=", "(?!", "(?<=", "(?<!"];

/// A value pattern: matches a token that equals it, or that the pattern matches as a
/// regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Option<Regex>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let anchored = if LOOK_AROUND_GROUPS.iter().any(|group| source.contains(group)) {
            format!("^(?:{source})")
        } else {
            format!("^(?:{source})$")
        };
        let regex = match Regex::new(&anchored) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::warn!(
                    "pattern '{source}' is not a valid regular expression, \
                     it will only match literally: {err}"
                );
                None
            }
        };
        Self { source, regex }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, token: &str) -> bool {
        // a match that hits the backtracking limit counts as no match
        self.source == token
            || self
                .regex
                .as_ref()
                .is_some_and(|re| re.is_match(token).unwrap_or(false))
    }
}

/// One `axis-pattern` segment of a key
#[derive(Debug, Clone)]
pub struct Condition {
    axis: String,
    pattern: Pattern,
}

impl Condition {
    pub fn new(axis: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            axis: axis.into(),
            pattern,
        }
    }

    pub fn axis(&self) -> &str {
        &self.axis
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn is_branch(&self) -> bool {
        self.axis == BRANCH_AXIS
    }

    /// Test against a matrix row. Any token of the row's value (canonical or alias) may
    /// match. An axis the row does not have never matches.
    pub fn matches_row(&self, row: &MatrixRow) -> bool {
        row.get(&self.axis)
            .is_some_and(|value| value.tokens().any(|token| self.pattern.matches(token)))
    }

    pub fn matches(&self, row: &MatrixRow, branch: &str) -> bool {
        if self.is_branch() {
            self.pattern.matches(branch)
        } else {
            self.matches_row(row)
        }
    }
}

/// A mapping key split into its conditions and the option it targets
#[derive(Debug, Clone)]
pub struct ConditionalKey {
    raw: String,
    conditions: Vec<Condition>,
    option: String,
    span: Span,
}

impl ConditionalKey {
    pub fn parse(key: &RawScalar) -> Result<Self, ResolveError> {
        let raw = key.as_str();
        let invalid = |reason: &str| ResolveError::InvalidCondition {
            key: raw.to_string(),
            reason: reason.to_string(),
            span: *key.span(),
        };

        let mut segments: Vec<&str> = raw.split(':').collect();
        let option = segments.pop().unwrap_or_default().trim();
        if option.is_empty() {
            return Err(invalid("the key does not name an option after the last ':'"));
        }

        let conditions = segments
            .into_iter()
            .map(|segment| {
                let Some((axis, pattern)) = segment.trim().split_once('-') else {
                    return Err(invalid(&format!(
                        "'{segment}' should have the form <axis>-<pattern>"
                    )));
                };
                if axis.is_empty() {
                    return Err(invalid(&format!("'{segment}' has no axis name")));
                }
                Ok(Condition::new(axis, Pattern::new(pattern)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: raw.to_string(),
            conditions,
            option: option.to_string(),
            span: *key.span(),
        })
    }

    /// The key as written in the document
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn option(&self) -> &str {
        &self.option
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn is_conditional(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// True when every condition holds for this row and branch
    pub fn matches(&self, row: &MatrixRow, branch: &str) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(row, branch))
    }

    /// True when at least one of `rows` satisfies every matrix condition. Branch conditions
    /// are not considered: the branch is not known until the document is expanded.
    pub fn can_match(&self, rows: &[MatrixRow]) -> bool {
        rows.iter().any(|row| {
            self.conditions
                .iter()
                .filter(|condition| !condition.is_branch())
                .all(|condition| condition.matches_row(row))
        })
    }
}
