use std::collections::{HashMap, hash_map::Entry};

use indexmap::IndexMap;
use serde::Serialize;

use crate::{error::ResolveError, repository::Repository, value::Value};

/// One fully resolved job: a matrix row with the options and variables that apply to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedJob {
    matrix: IndexMap<String, Vec<String>>,
    matrix_row: IndexMap<String, String>,
    options: IndexMap<String, Value>,
    variables: IndexMap<String, Value>,
}

impl ResolvedJob {
    pub fn new(
        matrix: IndexMap<String, Vec<String>>,
        matrix_row: IndexMap<String, String>,
        options: IndexMap<String, Value>,
        variables: IndexMap<String, Value>,
    ) -> Self {
        Self {
            matrix,
            matrix_row,
            options,
            variables,
        }
    }

    /// Every axis of the document with its canonical values
    pub fn matrix(&self) -> &IndexMap<String, Vec<String>> {
        &self.matrix
    }

    /// The canonical value of each axis for this job
    pub fn matrix_row(&self) -> &IndexMap<String, String> {
        &self.matrix_row
    }

    pub fn options(&self) -> &IndexMap<String, Value> {
        &self.options
    }

    pub fn variables(&self) -> &IndexMap<String, Value> {
        &self.variables
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name)
    }

    /// The prefix shared by every job of a repository branch: `<name>-<branch>`
    pub fn job_group(repository: &Repository) -> String {
        format!("{}-{}", repository.name, repository.branch)
    }

    /// `<name>-<branch>` followed by the row's values, ordered by axis name
    pub fn job_name(&self, repository: &Repository) -> String {
        let mut name = Self::job_group(repository);
        let mut axes: Vec<_> = self.matrix_row.iter().collect();
        axes.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (_, value) in axes {
            name.push('-');
            name.push_str(value);
        }
        name
    }

    /// `axis=value` pairs of the row, in axis declaration order
    pub fn describe_row(&self) -> String {
        let pairs: Vec<_> = self
            .matrix_row
            .iter()
            .map(|(axis, value)| format!("{axis}={value}"))
            .collect();
        pairs.join(", ")
    }
}

/// Fails on the first two jobs that would share a name, since one would replace the other
/// wherever jobs are stored by name.
pub(crate) fn ensure_unique_names(
    jobs: &[ResolvedJob],
    repository: &Repository,
) -> Result<(), ResolveError> {
    let mut seen: HashMap<String, &ResolvedJob> = HashMap::with_capacity(jobs.len());
    for job in jobs {
        match seen.entry(job.job_name(repository)) {
            Entry::Occupied(entry) => {
                return Err(ResolveError::DuplicateJobName {
                    name: entry.key().clone(),
                    first: entry.get().describe_row(),
                    second: job.describe_row(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(job);
            }
        }
    }
    Ok(())
}
