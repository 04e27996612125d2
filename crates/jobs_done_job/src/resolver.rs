//! Option resolution: from a document to one set of options per matrix row
//!
//! A [`JobTemplate`] is built once per document. Building it checks every top-level entry
//! against the schema, parses every (nested) conditional key and verifies that each
//! condition can match at least one row of the full matrix. Expanding the template then
//! only evaluates conditions, it cannot fail on the document's structure.

use std::collections::HashMap;

use indexmap::IndexMap;
use jobs_done_yaml::{RawDocument, RawValue, parse_bool};

use crate::{
    condition::{ConditionalKey, Pattern},
    error::ResolveError,
    job::{ResolvedJob, ensure_unique_names},
    matrix::{ExclusionRule, Matrix, MatrixRow, is_excluded},
    repository::Repository,
    schema::{self, BRANCH_PATTERNS, EXCLUDE, IGNORE_UNMATCHABLE, MATRIX, OptionCategory},
    substitution::Substitution,
    value::Value,
};

/// A value with its conditional keys already parsed
#[derive(Debug, Clone)]
enum Node {
    Scalar(String),
    List(Vec<Node>),
    Map(Vec<Entry>),
}

#[derive(Debug, Clone)]
struct Entry {
    key: ConditionalKey,
    value: Node,
}

impl Node {
    fn build(value: &RawValue) -> Result<Self, ResolveError> {
        Ok(match value {
            RawValue::Scalar(scalar) => Node::Scalar(scalar.as_str().to_string()),
            RawValue::List(list) => {
                Node::List(list.iter().map(Node::build).collect::<Result<_, _>>()?)
            }
            RawValue::Map(mapping) => Node::Map(
                mapping
                    .iter()
                    .map(|(key, value)| {
                        Ok(Entry {
                            key: ConditionalKey::parse(key)?,
                            value: Node::build(value)?,
                        })
                    })
                    .collect::<Result<_, ResolveError>>()?,
            ),
        })
    }

    /// Remove nested entries whose conditions cannot match any row, or report the first one
    fn prune(self, rows: &[MatrixRow], ignore_unmatchable: bool) -> Result<Self, ResolveError> {
        Ok(match self {
            Node::Scalar(_) => self,
            Node::List(items) => Node::List(
                items
                    .into_iter()
                    .map(|item| item.prune(rows, ignore_unmatchable))
                    .collect::<Result<_, _>>()?,
            ),
            Node::Map(entries) => {
                let mut kept = Vec::with_capacity(entries.len());
                for entry in entries {
                    if check_matchable(&entry.key, rows, ignore_unmatchable)? {
                        kept.push(Entry {
                            key: entry.key,
                            value: entry.value.prune(rows, ignore_unmatchable)?,
                        });
                    }
                }
                Node::Map(kept)
            }
        })
    }

    fn resolve(&self, row: &MatrixRow, branch: &str) -> Value {
        match self {
            Node::Scalar(s) => Value::Scalar(s.clone()),
            Node::List(items) => {
                Value::List(items.iter().map(|item| item.resolve(row, branch)).collect())
            }
            Node::Map(entries) => {
                let mut map = IndexMap::new();
                for entry in entries.iter().filter(|e| e.key.matches(row, branch)) {
                    map.insert(entry.key.option().to_string(), entry.value.resolve(row, branch));
                }
                Value::Map(map)
            }
        }
    }
}

/// Returns whether the key should be kept. Unmatchable keys are an error, or dropped when
/// `ignore_unmatchable` is set.
fn check_matchable(
    key: &ConditionalKey,
    rows: &[MatrixRow],
    ignore_unmatchable: bool,
) -> Result<bool, ResolveError> {
    if key.can_match(rows) {
        return Ok(true);
    }
    if ignore_unmatchable {
        tracing::debug!("ignoring '{}', its condition matches no matrix row", key.raw());
        return Ok(false);
    }
    Err(ResolveError::UnmatchableCondition {
        key: key.raw().to_string(),
        span: *key.span(),
    })
}

#[derive(Debug, Clone)]
struct TopLevelEntry {
    key: ConditionalKey,
    category: OptionCategory,
    value: Node,
}

/// A validated document, ready to be expanded into jobs for a repository
#[derive(Debug, Clone)]
pub struct JobTemplate {
    matrix: Matrix,
    exclusions: Vec<ExclusionRule>,
    entries: Vec<TopLevelEntry>,
}

impl JobTemplate {
    pub fn new(document: &RawDocument) -> Result<Self, ResolveError> {
        let mut matrix = Matrix::default();
        let mut exclusions = Vec::new();
        let mut entries = Vec::new();
        let mut ignore_unmatchable = false;

        for (raw_key, value) in document.root().iter() {
            let key = ConditionalKey::parse(raw_key)?;
            let option = key.option().to_string();
            let category = schema::classify(&option, value, *raw_key.span())?;

            match option.as_str() {
                MATRIX | IGNORE_UNMATCHABLE if key.is_conditional() => {
                    return Err(ResolveError::InvalidCondition {
                        key: key.raw().to_string(),
                        reason: format!("'{option}' cannot be conditioned"),
                        span: *key.span(),
                    });
                }
                MATRIX => matrix = Matrix::from_value(value)?,
                IGNORE_UNMATCHABLE => ignore_unmatchable = boolean(&key, value)?,
                EXCLUDE => {
                    let excluded = boolean(&key, value)?;
                    exclusions.push(ExclusionRule::new(key, excluded));
                }
                _ => entries.push(TopLevelEntry {
                    key,
                    category,
                    value: Node::build(value)?,
                }),
            }
        }

        // With an empty product there is nothing to resolve, and nothing to check against.
        let rows = matrix.rows();
        if rows.is_empty() {
            return Ok(Self {
                matrix,
                exclusions,
                entries,
            });
        }

        let mut kept_exclusions = Vec::with_capacity(exclusions.len());
        for rule in exclusions {
            if check_matchable(rule.key(), &rows, ignore_unmatchable)? {
                kept_exclusions.push(rule);
            }
        }

        let mut kept_entries = Vec::with_capacity(entries.len());
        for entry in entries {
            if check_matchable(&entry.key, &rows, ignore_unmatchable)? {
                kept_entries.push(TopLevelEntry {
                    value: entry.value.prune(&rows, ignore_unmatchable)?,
                    ..entry
                });
            }
        }

        Ok(Self {
            matrix,
            exclusions: kept_exclusions,
            entries: kept_entries,
        })
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Options and variables that apply to one row. A later declaration of the same option
    /// replaces the value of an earlier one.
    fn resolve_row(
        &self,
        row: &MatrixRow,
        branch: &str,
    ) -> (IndexMap<String, Value>, IndexMap<String, Value>) {
        let mut options = IndexMap::new();
        let mut variables = IndexMap::new();
        for entry in self.entries.iter().filter(|e| e.key.matches(row, branch)) {
            let target = match entry.category {
                OptionCategory::Core => &mut options,
                OptionCategory::Variable => &mut variables,
            };
            target.insert(entry.key.option().to_string(), entry.value.resolve(row, branch));
        }
        (options, variables)
    }

    /// Expand into one job per row that survives exclusion and `branch_patterns`
    pub fn jobs(&self, repository: &Repository) -> Result<Vec<ResolvedJob>, ResolveError> {
        let branch = repository.branch.as_str();
        let matrix = self.matrix.canonical_values();
        // substituted patterns may differ per row, so they are compiled on first use
        let mut branch_patterns = HashMap::new();
        let mut jobs = Vec::new();

        for row in self.matrix.rows() {
            let row_values = row.canonical();
            if is_excluded(&self.exclusions, &row, branch) {
                tracing::debug!("excluding matrix row {row_values:?}");
                continue;
            }

            let (options, variables) = self.resolve_row(&row, branch);
            let substitution = Substitution::new(&row, &variables, repository);
            let options = substitution.map(&options)?;
            let variables = substitution.map(&variables)?;

            if let Some(patterns) = options.get(BRANCH_PATTERNS)
                && !branch_matches(&mut branch_patterns, patterns, branch)
            {
                tracing::debug!(
                    "skipping matrix row {row_values:?}, \
                     branch '{branch}' matches no branch pattern"
                );
                continue;
            }

            jobs.push(ResolvedJob::new(matrix.clone(), row_values, options, variables));
        }

        ensure_unique_names(&jobs, repository)?;
        Ok(jobs)
    }
}

fn boolean(key: &ConditionalKey, value: &RawValue) -> Result<bool, ResolveError> {
    let scalar = value.as_scalar();
    scalar
        .and_then(|s| parse_bool(s.as_str()))
        .ok_or_else(|| ResolveError::InvalidValue {
            option: key.raw().to_string(),
            reason: format!(
                "expected a boolean (true/false, yes/no, on/off), got '{}'",
                scalar.map(|s| s.as_str()).unwrap_or_default()
            ),
            span: *value.span(),
        })
}

fn branch_matches(
    compiled: &mut HashMap<String, Pattern>,
    patterns: &Value,
    branch: &str,
) -> bool {
    patterns.scalars().into_iter().any(|source| {
        compiled
            .entry(source.to_string())
            .or_insert_with(|| Pattern::new(source))
            .matches(branch)
    })
}
